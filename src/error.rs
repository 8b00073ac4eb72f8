// src/error.rs
//! Error taxonomy for the ingest pipeline.
//!
//! `ValidationError` is per-item and recoverable (surfaced in the ingest
//! report). `ClassifierUnavailable` and `StoreError` are infrastructure
//! failures: the pipeline stops handing items to a dead dependency and
//! reports the remainder as not processed instead of dropping them.

use thiserror::Error;

/// Per-item validation failure. Never aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing or empty field `{0}`")]
    MissingField(&'static str),
    #[error("unparseable published_at `{0}`")]
    BadTimestamp(String),
}

/// The external classifier could not produce an answer (down, timed out,
/// malformed response). Retryable; not a property of the input text.
#[derive(Debug, Clone, Error)]
#[error("classifier unavailable: {reason}")]
pub struct ClassifierUnavailable {
    pub reason: String,
}

impl ClassifierUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn timeout(provider: &str) -> Self {
        Self::new(format!("{provider}: classify call timed out"))
    }
}

/// Durable store failure. A failed `put` means the event is *not* persisted;
/// the caller retries or surfaces the error, never swallows it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage write failed: {0}")]
    Write(#[from] std::io::Error),
    #[error("storage encode/decode failed: {0}")]
    Codec(#[from] serde_json::Error),
}
