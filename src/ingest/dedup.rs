// src/ingest/dedup.rs
//! Two-tier duplicate detection: exact id, exact content fingerprint, and a
//! near-duplicate similarity check over normalized text.
//!
//! Similarity: `strsim::normalized_levenshtein` against every stored
//! normalized text; at this scale a linear scan is fine. The threshold
//! defaults to 0.90 and is configurable.

use std::collections::HashSet;

use once_cell::sync::OnceCell;
use regex::Regex;
use sha2::{Digest, Sha256};
use strsim::normalized_levenshtein;

use crate::ingest::types::ScoredEvent;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.90;

/// Lowercase, strip punctuation, collapse whitespace runs.
pub fn normalize_content(title: &str, body: &str) -> String {
    static RE_PUNCT: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_punct = RE_PUNCT.get_or_init(|| Regex::new(r"[^\p{L}\p{N}\s]+").unwrap());
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let joined = format!("{title} {body}").to_lowercase();
    let stripped = re_punct.replace_all(&joined, "");
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

/// Short hex fingerprint of the normalized title+body.
pub fn content_fingerprint(title: &str, body: &str) -> String {
    let digest = Sha256::digest(normalize_content(title, body).as_bytes());
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

/// Read-only point-in-time view of the store, used for duplicate decisions.
/// The pipeline `admit`s newly accepted items so that later items in the same
/// batch are checked against them as well.
#[derive(Debug, Clone, Default)]
pub struct SnapshotView {
    ids: HashSet<String>,
    fingerprints: HashSet<String>,
    texts: Vec<String>,
}

impl SnapshotView {
    pub fn new(
        ids: HashSet<String>,
        fingerprints: HashSet<String>,
        texts: Vec<String>,
    ) -> Self {
        Self {
            ids,
            fingerprints,
            texts,
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn contains_fingerprint(&self, fp: &str) -> bool {
        self.fingerprints.contains(fp)
    }

    pub fn near_duplicate(&self, normalized: &str, threshold: f64) -> bool {
        self.texts
            .iter()
            .any(|t| normalized_levenshtein(normalized, t) >= threshold)
    }

    pub fn admit(&mut self, id: String, fingerprint: String, normalized: String) {
        self.ids.insert(id);
        self.fingerprints.insert(fingerprint);
        self.texts.push(normalized);
    }
}

/// Duplicate check for an already-classified, relevant candidate.
pub fn is_duplicate(candidate: &ScoredEvent, snapshot: &SnapshotView, threshold: f64) -> bool {
    if snapshot.contains_id(&candidate.event.id) {
        return true;
    }
    let fp = content_fingerprint(&candidate.event.title, &candidate.event.body);
    if snapshot.contains_fingerprint(&fp) {
        return true;
    }
    let norm = normalize_content(&candidate.event.title, &candidate.event.body);
    snapshot.near_duplicate(&norm, threshold)
}
