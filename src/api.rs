// src/api.rs
//! HTTP surface: ingest (write path), retrieve/stats/health (read paths).

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use crate::ingest::types::{RawEvent, StoredEvent};
use crate::ingest::IngestPipeline;
use crate::rank;
use crate::store::EventStore;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IngestPipeline>,
    pub store: Arc<EventStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(ingest))
        .route("/retrieve", get(retrieve))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// POST /ingest — JSON array of raw events in, per-batch report out.
///
/// A body that is not valid JSON (or not an array) is the only hard 422;
/// per-item problems land inside the 200 report.
async fn ingest(
    State(state): State<AppState>,
    payload: Result<Json<Vec<RawEvent>>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(batch)) => {
            let report = state.pipeline.ingest(batch).await;
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(rejection) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "malformed request body",
                "detail": rejection.body_text(),
            })),
        )
            .into_response(),
    }
}

/// GET /retrieve — all stored events, score desc / recency desc / id asc.
async fn retrieve(State(state): State<AppState>) -> Json<Vec<StoredEvent>> {
    Json(rank::ranked(state.store.get_all()))
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
    timestamp: DateTime<Utc>,
    event_count: usize,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        timestamp: Utc::now(),
        event_count: state.store.len(),
    })
}

#[derive(serde::Serialize)]
struct ScoreDistribution {
    min: f64,
    max: f64,
    avg: f64,
}

#[derive(serde::Serialize)]
struct Stats {
    total_events: usize,
    sources: BTreeMap<String, usize>,
    score_distribution: ScoreDistribution,
}

async fn stats(State(state): State<AppState>) -> Json<Stats> {
    let events = state.store.get_all();

    let mut sources: BTreeMap<String, usize> = BTreeMap::new();
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for ev in &events {
        *sources.entry(ev.source.clone()).or_default() += 1;
        min = min.min(ev.score);
        max = max.max(ev.score);
        sum += ev.score;
    }

    let dist = if events.is_empty() {
        ScoreDistribution {
            min: 0.0,
            max: 0.0,
            avg: 0.0,
        }
    } else {
        ScoreDistribution {
            min,
            max,
            avg: sum / events.len() as f64,
        }
    };

    Json(Stats {
        total_events: events.len(),
        sources,
        score_distribution: dist,
    })
}
