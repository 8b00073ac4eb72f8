// src/rank.rs
//! Deterministic ranked retrieval, plus the presentation-only recency decay.

use chrono::{DateTime, Utc};

use crate::ingest::types::StoredEvent;

/// Sort for retrieval: relevance score descending, then `published_at`
/// descending (newest first), then id ascending. Fully deterministic; stable
/// across repeated calls without new ingestion.
pub fn ranked(mut events: Vec<StoredEvent>) -> Vec<StoredEvent> {
    events.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.published_at.cmp(&a.published_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    events
}

/// Exponential recency decay: `score * exp(-age_hours / half_life_hours)`.
///
/// This belongs to the display layer. The store never keeps a decayed score;
/// dashboards apply it on read so the stored score keeps its meaning.
pub fn decayed_score(
    score: f64,
    published_at: DateTime<Utc>,
    now: DateTime<Utc>,
    half_life_hours: f64,
) -> f64 {
    if half_life_hours <= 0.0 {
        return score;
    }
    let age_hours = (now - published_at).num_seconds().max(0) as f64 / 3600.0;
    score * (-age_hours / half_life_hours).exp()
}
