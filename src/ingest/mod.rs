// src/ingest/mod.rs
//! Batch ingest pipeline: validate -> classify -> dedup -> persist.
//!
//! Items flow independently; a validation failure never aborts the batch.
//! Infrastructure failures (classifier or storage down) stop the remainder
//! of the batch and are surfaced in the report rather than dropped.

pub mod dedup;
pub mod providers;
pub mod scheduler;
pub mod types;
pub mod validate;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::classify::{ClassifierAdapter, DynClassifier};
use crate::ingest::dedup::{content_fingerprint, is_duplicate, normalize_content};
use crate::ingest::types::{RawEvent, StoredEvent};
use crate::store::{EventStore, PutOutcome};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_received_total", "Raw events handed to the pipeline.");
        describe_counter!("ingest_accepted_total", "Events persisted to the store.");
        describe_counter!(
            "ingest_rejected_validation_total",
            "Events rejected by shape/timestamp validation."
        );
        describe_counter!(
            "ingest_filtered_irrelevant_total",
            "Events the classifier marked not IT-critical."
        );
        describe_counter!(
            "ingest_duplicates_total",
            "Relevant events skipped as id or content duplicates."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("ingest_batch_ms", "Wall time per ingest batch.");
        describe_gauge!("store_events", "Events currently in the durable store.");
    });
}

/// Per-item failure detail surfaced in the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemError {
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of one ingest batch. Counts always add up:
/// `received == accepted + rejected_validation + filtered_irrelevant
///             + duplicates_skipped + not_processed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    pub received: usize,
    pub accepted: usize,
    pub rejected_validation: usize,
    pub filtered_irrelevant: usize,
    pub duplicates_skipped: usize,
    /// Items skipped because an infrastructure dependency failed mid-batch.
    /// Retryable; includes the item that hit the failure.
    pub not_processed: usize,
    pub errors: Vec<ItemError>,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineCfg {
    pub similarity_threshold: f64,
    pub classify_timeout: Option<Duration>,
}

impl Default for PipelineCfg {
    fn default() -> Self {
        Self {
            similarity_threshold: dedup::DEFAULT_SIMILARITY_THRESHOLD,
            classify_timeout: None,
        }
    }
}

/// The only writer to the store. Concurrent `ingest` calls are serialized by
/// an async mutex so duplicate decisions stay correct under concurrency;
/// reads go straight to the store and see pre- or post-batch state only.
pub struct IngestPipeline {
    store: Arc<EventStore>,
    classifier: ClassifierAdapter,
    similarity_threshold: f64,
    gate: tokio::sync::Mutex<()>,
}

impl IngestPipeline {
    pub fn new(store: Arc<EventStore>, classifier: DynClassifier, cfg: PipelineCfg) -> Self {
        Self {
            store,
            classifier: ClassifierAdapter::new(classifier, cfg.classify_timeout),
            similarity_threshold: cfg.similarity_threshold,
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    pub async fn ingest(&self, batch: Vec<RawEvent>) -> IngestReport {
        let _serialized = self.gate.lock().await;
        ensure_metrics_described();
        let t0 = std::time::Instant::now();

        let mut report = IngestReport {
            received: batch.len(),
            ..Default::default()
        };

        // One snapshot per batch; accepted items are admitted into it so
        // later items in the same batch are deduped against them too.
        let mut snapshot = self.store.snapshot();

        for (index, raw) in batch.iter().enumerate() {
            let event = match validate::validate(raw) {
                Ok(ev) => ev,
                Err(e) => {
                    report.rejected_validation += 1;
                    report.errors.push(ItemError {
                        index,
                        id: raw.id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let scored = match self.classifier.score(&event).await {
                Ok(s) => s,
                Err(e) => {
                    // Classifier is down: surface and stop feeding it.
                    tracing::warn!(error = %e, index, id = %event.id, "aborting batch remainder");
                    report.errors.push(ItemError {
                        index,
                        id: Some(event.id.clone()),
                        reason: e.to_string(),
                    });
                    report.not_processed = batch.len() - index;
                    break;
                }
            };

            if !scored.is_relevant {
                tracing::debug!(id = %scored.event.id, score = scored.relevance_score, "filtered out");
                report.filtered_irrelevant += 1;
                continue;
            }

            if is_duplicate(&scored, &snapshot, self.similarity_threshold) {
                tracing::debug!(id = %scored.event.id, "duplicate skipped");
                report.duplicates_skipped += 1;
                continue;
            }

            let fingerprint = content_fingerprint(&scored.event.title, &scored.event.body);
            let normalized = normalize_content(&scored.event.title, &scored.event.body);
            let id = scored.event.id.clone();
            let stored = StoredEvent::from_scored(scored, fingerprint.clone(), Utc::now());

            match self.store.put(stored) {
                Ok(PutOutcome::Inserted) => {
                    report.accepted += 1;
                    snapshot.admit(id, fingerprint, normalized);
                }
                // Unreachable in practice (snapshot already covers ids),
                // but still a counted no-op rather than an overwrite.
                Ok(PutOutcome::AlreadyPresent) => {
                    report.duplicates_skipped += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, index, id = %id, "storage write failed; aborting batch remainder");
                    report.errors.push(ItemError {
                        index,
                        id: Some(id),
                        reason: e.to_string(),
                    });
                    report.not_processed = batch.len() - index;
                    break;
                }
            }
        }

        counter!("ingest_received_total").increment(report.received as u64);
        counter!("ingest_accepted_total").increment(report.accepted as u64);
        counter!("ingest_rejected_validation_total").increment(report.rejected_validation as u64);
        counter!("ingest_filtered_irrelevant_total").increment(report.filtered_irrelevant as u64);
        counter!("ingest_duplicates_total").increment(report.duplicates_skipped as u64);
        histogram!("ingest_batch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        gauge!("store_events").set(self.store.len() as f64);

        tracing::info!(
            received = report.received,
            accepted = report.accepted,
            rejected = report.rejected_validation,
            irrelevant = report.filtered_irrelevant,
            duplicates = report.duplicates_skipped,
            not_processed = report.not_processed,
            "ingest batch done"
        );

        report
    }
}
