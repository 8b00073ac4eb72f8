// src/ingest/types.rs
//! Event records at each stage of the pipeline, plus the source-provider
//! capability the scheduler polls.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Untrusted wire-shaped input. Every field is optional so that a batch with
/// one malformed item still deserializes; the validator decides what is
/// actually acceptable and reports the rest per item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Canonical event after validation. All fields non-empty except `body`,
/// which defaults to `""` when the raw item carried `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub source: String,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
}

/// An `Event` with the classifier verdict attached. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEvent {
    pub event: Event,
    pub relevance_score: f64,
    pub is_relevant: bool,
}

/// A persisted event. `content_fingerprint` backs content-level dedup;
/// `ingested_at` is bookkeeping only and never participates in ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: String,
    pub source: String,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub score: f64,
    pub content_fingerprint: String,
    pub ingested_at: DateTime<Utc>,
}

impl StoredEvent {
    pub fn from_scored(scored: ScoredEvent, fingerprint: String, ingested_at: DateTime<Utc>) -> Self {
        let ScoredEvent {
            event,
            relevance_score,
            ..
        } = scored;
        Self {
            id: event.id,
            source: event.source,
            title: event.title,
            body: event.body,
            published_at: event.published_at,
            score: relevance_score,
            content_fingerprint: fingerprint,
            ingested_at,
        }
    }
}

/// A crawler. Rate limiting and markup sanitization are the provider's
/// concern; the pipeline only sees a bounded batch of raw candidates.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_batch(&self) -> Result<Vec<RawEvent>>;
    fn name(&self) -> &str;
}
