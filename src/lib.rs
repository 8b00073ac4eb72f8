// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod rank;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::ingest::types::{Event, RawEvent, ScoredEvent, StoredEvent};
pub use crate::ingest::{IngestPipeline, IngestReport, PipelineCfg};
pub use crate::store::EventStore;
