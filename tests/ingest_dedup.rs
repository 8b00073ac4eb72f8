// tests/ingest_dedup.rs
use chrono::{TimeZone, Utc};

use it_newsfeed::ingest::dedup::{
    content_fingerprint, is_duplicate, normalize_content, SnapshotView, DEFAULT_SIMILARITY_THRESHOLD,
};
use it_newsfeed::{Event, ScoredEvent};

fn scored(id: &str, title: &str, body: &str) -> ScoredEvent {
    ScoredEvent {
        event: Event {
            id: id.into(),
            source: "test".into(),
            title: title.into(),
            body: body.into(),
            published_at: Utc.with_ymd_and_hms(2025, 9, 30, 18, 0, 0).unwrap(),
        },
        relevance_score: 0.9,
        is_relevant: true,
    }
}

fn snapshot_with(id: &str, title: &str, body: &str) -> SnapshotView {
    let mut snap = SnapshotView::default();
    snap.admit(
        id.to_string(),
        content_fingerprint(title, body),
        normalize_content(title, body),
    );
    snap
}

#[test]
fn id_collision_is_a_duplicate_even_with_new_content() {
    let snap = snapshot_with("sec-001", "Old incident", "");
    let cand = scored("sec-001", "Entirely different breaking story", "fresh body");
    assert!(is_duplicate(&cand, &snap, DEFAULT_SIMILARITY_THRESHOLD));
}

#[test]
fn identical_content_under_a_new_id_is_a_duplicate() {
    let snap = snapshot_with("sec-001", "Major DNS outage at provider", "resolvers failing");
    let cand = scored("sec-999", "Major DNS outage at provider!", "Resolvers   failing");
    assert!(is_duplicate(&cand, &snap, DEFAULT_SIMILARITY_THRESHOLD));
}

#[test]
fn near_identical_content_is_a_duplicate_above_the_threshold() {
    let snap = snapshot_with(
        "sec-001",
        "Critical security patch released for popular web server",
        "",
    );
    let cand = scored(
        "sec-002",
        "Critical security patches released for popular web server",
        "",
    );
    assert!(is_duplicate(&cand, &snap, DEFAULT_SIMILARITY_THRESHOLD));
}

#[test]
fn unrelated_content_is_not_a_duplicate() {
    let snap = snapshot_with("sec-001", "Major DNS outage at provider", "");
    let cand = scored("sec-002", "New keyboard firmware adds RGB profiles", "");
    assert!(!is_duplicate(&cand, &snap, DEFAULT_SIMILARITY_THRESHOLD));
}

#[test]
fn threshold_is_honored() {
    let snap = snapshot_with("a", "alpha beta gamma delta", "");
    let cand = scored("b", "alpha beta gamma delt", "");
    // Similar but below a strict 0.99 cutoff.
    assert!(!is_duplicate(&cand, &snap, 0.99));
    assert!(is_duplicate(&cand, &snap, 0.90));
}
