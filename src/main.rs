//! IT Newsfeed — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the store, pipeline, providers, and
//! metrics. See `README.md` for quickstart.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use it_newsfeed::classify::{DynClassifier, KeywordClassifier, RemoteClassifier};
use it_newsfeed::config::Config;
use it_newsfeed::ingest::providers::{reddit::RedditProvider, rss::RssProvider};
use it_newsfeed::ingest::types::SourceProvider;
use it_newsfeed::ingest::{scheduler, IngestPipeline, PipelineCfg};
use it_newsfeed::metrics::Metrics;
use it_newsfeed::store::EventStore;
use it_newsfeed::{api, AppState};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("it_newsfeed=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn build_classifier(cfg: &Config) -> DynClassifier {
    match &cfg.classifier_url {
        Some(url) => {
            tracing::info!(%url, "using remote classifier");
            Arc::new(RemoteClassifier::new(url.clone()))
        }
        None => {
            tracing::info!("no classifier URL configured; using keyword fallback");
            Arc::new(KeywordClassifier::new(cfg.relevance_threshold))
        }
    }
}

fn build_providers(cfg: &Config) -> Vec<Box<dyn SourceProvider>> {
    let mut providers: Vec<Box<dyn SourceProvider>> = Vec::new();
    for url in &cfg.rss_feeds {
        let source = rss_source_name(url);
        providers.push(Box::new(RssProvider::from_url(source, url.clone())));
    }
    for sub in &cfg.subreddits {
        providers.push(Box::new(RedditProvider::from_subreddit(
            sub.clone(),
            cfg.item_limit_per_source,
        )));
    }
    providers
}

/// "https://arstechnica.com/feed/" -> "rss_arstechnica_com"
fn rss_source_name(url: &str) -> String {
    let host = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or("feed");
    format!("rss_{}", host.replace('.', "_"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::load()?;

    let store = Arc::new(EventStore::open(&cfg.store_path)?);
    let classifier = build_classifier(&cfg);
    let pipeline = Arc::new(IngestPipeline::new(
        store.clone(),
        classifier,
        PipelineCfg {
            similarity_threshold: cfg.similarity_threshold,
            classify_timeout: cfg.classify_timeout(),
        },
    ));

    let providers = build_providers(&cfg);
    if !providers.is_empty() && cfg.poll_interval_secs > 0 {
        scheduler::spawn(
            pipeline.clone(),
            providers,
            scheduler::SchedulerCfg {
                interval: std::time::Duration::from_secs(cfg.poll_interval_secs),
                item_limit_per_source: cfg.item_limit_per_source,
            },
        );
    }

    let metrics = Metrics::init();
    let state = AppState {
        pipeline,
        store,
    };
    let router = api::create_router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
