// src/ingest/validate.rs
//! Raw-event validation: shape checks plus timestamp parsing.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::ValidationError;
use crate::ingest::types::{Event, RawEvent};

/// Check a raw event against the required shape and normalize it into a
/// canonical `Event`. Pure; no side effects.
///
/// Rules:
/// - `id`, `source`, `title` must be present and non-empty after trimming.
/// - `body: null` is accepted and becomes `""`.
/// - `published_at` must parse as RFC 3339, or as a naive
///   `YYYY-MM-DDTHH:MM:SS[.f]` instant which is then treated as UTC.
pub fn validate(raw: &RawEvent) -> Result<Event, ValidationError> {
    let id = required(&raw.id, "id")?;
    let source = required(&raw.source, "source")?;
    let title = required(&raw.title, "title")?;

    let ts_raw = required(&raw.published_at, "published_at")?;
    let published_at = parse_published_at(&ts_raw)
        .ok_or_else(|| ValidationError::BadTimestamp(ts_raw.clone()))?;

    Ok(Event {
        id,
        source,
        title,
        body: raw.body.clone().unwrap_or_default(),
        published_at,
    })
}

fn required(field: &Option<String>, name: &'static str) -> Result<String, ValidationError> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(ValidationError::MissingField(name)),
    }
}

/// Parse an ISO-8601-like instant. Offsets (incl. `Z`) are honored;
/// a missing offset means UTC.
pub fn parse_published_at(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(id: &str, source: &str, title: &str, ts: &str) -> RawEvent {
        RawEvent {
            id: Some(id.into()),
            source: Some(source.into()),
            title: Some(title.into()),
            body: None,
            published_at: Some(ts.into()),
        }
    }

    #[test]
    fn naive_timestamp_is_treated_as_utc() {
        let ev = validate(&raw("a", "rss", "t", "2025-09-30T18:00:00")).unwrap();
        assert_eq!(
            ev.published_at,
            Utc.with_ymd_and_hms(2025, 9, 30, 18, 0, 0).unwrap()
        );
    }

    #[test]
    fn rfc3339_offsets_are_converted_to_utc() {
        let ev = validate(&raw("a", "rss", "t", "2025-09-30T20:00:00+02:00")).unwrap();
        assert_eq!(
            ev.published_at,
            Utc.with_ymd_and_hms(2025, 9, 30, 18, 0, 0).unwrap()
        );
        let z = validate(&raw("a", "rss", "t", "2025-09-30T18:00:00Z")).unwrap();
        assert_eq!(z.published_at, ev.published_at);
    }

    #[test]
    fn null_body_becomes_empty_string() {
        let ev = validate(&raw("a", "rss", "t", "2025-09-30T18:00:00")).unwrap();
        assert_eq!(ev.body, "");
    }

    #[test]
    fn missing_or_empty_required_fields_are_rejected() {
        let mut r = raw("a", "rss", "t", "2025-09-30T18:00:00");
        r.id = None;
        assert_eq!(validate(&r), Err(ValidationError::MissingField("id")));

        let mut r = raw("a", "rss", "t", "2025-09-30T18:00:00");
        r.title = Some("   ".into());
        assert_eq!(validate(&r), Err(ValidationError::MissingField("title")));

        let mut r = raw("a", "rss", "t", "2025-09-30T18:00:00");
        r.source = Some(String::new());
        assert_eq!(validate(&r), Err(ValidationError::MissingField("source")));
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        let r = raw("a", "rss", "t", "not-a-valid-timestamp");
        assert_eq!(
            validate(&r),
            Err(ValidationError::BadTimestamp("not-a-valid-timestamp".into()))
        );
    }

    #[test]
    fn field_values_round_trip() {
        let mut r = raw("sec-001", "reddit_sysadmin", "DNS outage", "2025-09-30T18:00:00");
        r.body = Some("resolver down".into());
        let ev = validate(&r).unwrap();
        assert_eq!(ev.id, "sec-001");
        assert_eq!(ev.source, "reddit_sysadmin");
        assert_eq!(ev.title, "DNS outage");
        assert_eq!(ev.body, "resolver down");
    }
}
