// src/ingest/providers/mock.rs
//! In-memory provider for tests and local demos.

use anyhow::Result;
use async_trait::async_trait;

use crate::ingest::types::{RawEvent, SourceProvider};

pub struct MockProvider {
    source: String,
    events: Vec<RawEvent>,
}

impl MockProvider {
    pub fn new(source: impl Into<String>, events: Vec<RawEvent>) -> Self {
        Self {
            source: source.into(),
            events,
        }
    }
}

#[async_trait]
impl SourceProvider for MockProvider {
    async fn fetch_batch(&self) -> Result<Vec<RawEvent>> {
        Ok(self.events.clone())
    }

    fn name(&self) -> &str {
        &self.source
    }
}
