// src/ingest/scheduler.rs
//! Timer loop that polls providers and feeds the pipeline. No contract
//! beyond "invoke ingest with a fresh batch"; a failing provider only costs
//! its own batch.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::ingest::types::{RawEvent, SourceProvider};
use crate::ingest::IngestPipeline;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub interval: Duration,
    pub item_limit_per_source: usize,
}

pub fn spawn(
    pipeline: Arc<IngestPipeline>,
    providers: Vec<Box<dyn SourceProvider>>,
    cfg: SchedulerCfg,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cfg.interval);
        loop {
            ticker.tick().await;

            let mut batch: Vec<RawEvent> = Vec::new();
            for provider in &providers {
                match provider.fetch_batch().await {
                    Ok(mut events) => {
                        events.truncate(cfg.item_limit_per_source);
                        batch.append(&mut events);
                    }
                    Err(e) => {
                        tracing::warn!(error = ?e, provider = provider.name(), "provider error");
                        counter!("ingest_provider_errors_total").increment(1);
                    }
                }
            }

            let report = pipeline.ingest(batch).await;
            tracing::info!(
                target: "scheduler",
                received = report.received,
                accepted = report.accepted,
                duplicates = report.duplicates_skipped,
                "poll tick"
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classification, StubClassifier};
    use crate::ingest::providers::mock::MockProvider;
    use crate::ingest::PipelineCfg;
    use crate::store::EventStore;

    fn relevant(id: &str, title: &str) -> RawEvent {
        RawEvent {
            id: Some(id.into()),
            source: Some("mock".into()),
            title: Some(title.into()),
            body: None,
            published_at: Some("2025-09-30T18:00:00".into()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_feed_the_pipeline_and_reingestion_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(EventStore::open(dir.path().join("events.json")).unwrap());
        let classifier = Arc::new(StubClassifier::new(Classification {
            is_relevant: true,
            score: 0.9,
        }));
        let pipeline = Arc::new(IngestPipeline::new(
            store.clone(),
            classifier,
            PipelineCfg::default(),
        ));

        let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(MockProvider::new(
            "mock",
            vec![relevant("m-001", "Recurring outage announcement")],
        ))];
        let handle = spawn(
            pipeline,
            providers,
            SchedulerCfg {
                interval: Duration::from_secs(60),
                item_limit_per_source: 25,
            },
        );

        // First tick fires immediately; the mock item lands once.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.len(), 1);

        // Later ticks re-fetch the same item; dedup keeps the store stable.
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(store.len(), 1);

        handle.abort();
    }

    struct BrokenProvider;

    #[async_trait::async_trait]
    impl SourceProvider for BrokenProvider {
        async fn fetch_batch(&self) -> anyhow::Result<Vec<RawEvent>> {
            anyhow::bail!("connection refused")
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failing_provider_only_costs_its_own_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(EventStore::open(dir.path().join("events.json")).unwrap());
        let classifier = Arc::new(StubClassifier::new(Classification {
            is_relevant: true,
            score: 0.9,
        }));
        let pipeline = Arc::new(IngestPipeline::new(
            store.clone(),
            classifier,
            PipelineCfg::default(),
        ));

        let providers: Vec<Box<dyn SourceProvider>> = vec![
            Box::new(BrokenProvider),
            Box::new(MockProvider::new(
                "mock",
                vec![relevant("m-002", "Filesystem corruption incident")],
            )),
        ];
        let handle = spawn(
            pipeline,
            providers,
            SchedulerCfg {
                interval: Duration::from_secs(60),
                item_limit_per_source: 25,
            },
        );

        // The healthy provider's item still lands despite the broken one.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.len(), 1);

        handle.abort();
    }
}
