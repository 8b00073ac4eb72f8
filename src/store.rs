// src/store.rs
//! Durable event store: an in-memory map backed by a single JSON file.
//!
//! `put` reports success only after the whole collection has been written to
//! a temp file, fsynced, and renamed over the live file, so a crash after a
//! successful `put` never loses that event. The file is the single source of
//! truth across restarts.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StoreError;
use crate::ingest::dedup::{normalize_content, SnapshotView};
use crate::ingest::types::StoredEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    /// The id was already present. Idempotent success, not an error.
    AlreadyPresent,
}

#[derive(Debug)]
pub struct EventStore {
    path: PathBuf,
    inner: RwLock<HashMap<String, StoredEvent>>,
}

impl EventStore {
    /// Open (or create) a store at `path`, reloading any previously
    /// persisted events.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut map = HashMap::new();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            if !content.trim().is_empty() {
                let events: Vec<StoredEvent> = serde_json::from_str(&content)?;
                map = events.into_iter().map(|e| (e.id.clone(), e)).collect();
            }
        }
        tracing::info!(path = %path.display(), events = map.len(), "opened event store");

        Ok(Self {
            path,
            inner: RwLock::new(map),
        })
    }

    /// Persist one event. Idempotent on id: a repeated id is a no-op success.
    pub fn put(&self, event: StoredEvent) -> Result<PutOutcome, StoreError> {
        let mut map = self.inner.write().expect("store lock poisoned");
        if map.contains_key(&event.id) {
            return Ok(PutOutcome::AlreadyPresent);
        }

        // Insert, flush the whole collection, and only then report success.
        // On write failure the in-memory entry is rolled back so memory and
        // disk stay consistent.
        let id = event.id.clone();
        map.insert(id.clone(), event);
        if let Err(e) = persist(&self.path, &map) {
            map.remove(&id);
            return Err(e);
        }
        Ok(PutOutcome::Inserted)
    }

    /// All stored events, in unspecified order. Callers sort (see `rank`).
    pub fn get_all(&self) -> Vec<StoredEvent> {
        let map = self.inner.read().expect("store lock poisoned");
        map.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time view for duplicate decisions. Ids, fingerprints, and
    /// normalized texts only; never exposes mutable state.
    pub fn snapshot(&self) -> SnapshotView {
        let map = self.inner.read().expect("store lock poisoned");
        let mut ids = std::collections::HashSet::with_capacity(map.len());
        let mut fingerprints = std::collections::HashSet::with_capacity(map.len());
        let mut texts = Vec::with_capacity(map.len());
        for ev in map.values() {
            ids.insert(ev.id.clone());
            fingerprints.insert(ev.content_fingerprint.clone());
            texts.push(normalize_content(&ev.title, &ev.body));
        }
        SnapshotView::new(ids, fingerprints, texts)
    }
}

/// Write-then-rename so readers (and crashes) only ever see a complete file.
/// The parent directory is fsynced after the rename; without that, the
/// rename itself may not be durable when `put` returns.
fn persist(path: &Path, map: &HashMap<String, StoredEvent>) -> Result<(), StoreError> {
    let events: Vec<&StoredEvent> = map.values().collect();
    let json = serde_json::to_vec_pretty(&events)?;

    let tmp = path.with_extension("json.tmp");
    let mut f = fs::File::create(&tmp)?;
    f.write_all(&json)?;
    f.sync_all()?;
    fs::rename(&tmp, path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::File::open(parent)?.sync_all()?;
        }
    }
    Ok(())
}
