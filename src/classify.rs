// src/classify.rs
//! Relevance classification: capability trait + adapter.
//!
//! The actual model is an external black box. The adapter owns text
//! assembly (title first, then body) and the optional per-call timeout;
//! implementations only answer "is this IT-critical, and how confident".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClassifierUnavailable;
use crate::ingest::types::{Event, ScoredEvent};

/// Raw classifier verdict: whether the IT-critical label won, and the
/// winning label's confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub is_relevant: bool,
    pub score: f64,
}

/// Stateless classification capability. Deterministic for a given input and
/// model version, which is what makes stubbed tests reproducible.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierUnavailable>;
    fn name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn Classifier>;

/// Wraps a `Classifier` and turns validated events into scored ones.
pub struct ClassifierAdapter {
    inner: DynClassifier,
    timeout: Option<Duration>,
}

impl ClassifierAdapter {
    pub fn new(inner: DynClassifier, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }

    pub async fn score(&self, event: &Event) -> Result<ScoredEvent, ClassifierUnavailable> {
        let text = classification_text(&event.title, &event.body);
        let verdict = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.classify(&text))
                .await
                .map_err(|_| ClassifierUnavailable::timeout(self.inner.name()))??,
            None => self.inner.classify(&text).await?,
        };
        Ok(ScoredEvent {
            event: event.clone(),
            relevance_score: verdict.score,
            is_relevant: verdict.is_relevant,
        })
    }
}

/// Title weighted first; body appended on its own line when present.
pub fn classification_text(title: &str, body: &str) -> String {
    if body.is_empty() {
        title.to_string()
    } else {
        format!("{title}\n{body}")
    }
}

// ------------------------------------------------------------
// Implementations
// ------------------------------------------------------------

/// HTTP classifier service speaking a tiny JSON contract:
/// `POST {url} {"text": ...}` -> `{"is_relevant": bool, "score": f64}`.
pub struct RemoteClassifier {
    http: reqwest::Client,
    url: String,
}

impl RemoteClassifier {
    pub fn new(url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("it-newsfeed/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierUnavailable> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            text: &'a str,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            is_relevant: bool,
            score: f64,
        }

        let resp = self
            .http
            .post(&self.url)
            .json(&Req { text })
            .send()
            .await
            .map_err(|e| ClassifierUnavailable::new(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ClassifierUnavailable::new(format!(
                "classifier returned {}",
                resp.status()
            )));
        }
        let body: Resp = resp
            .json()
            .await
            .map_err(|e| ClassifierUnavailable::new(format!("malformed response: {e}")))?;
        Ok(Classification {
            is_relevant: body.is_relevant,
            score: body.score,
        })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

/// Deterministic local fallback when no remote classifier is configured.
/// Scores by weighted incident vocabulary hits; not a substitute for the
/// real model, but keeps the service usable offline.
pub struct KeywordClassifier {
    threshold: f64,
}

const VOCAB: &[(&str, f64)] = &[
    ("outage", 0.95),
    ("downtime", 0.85),
    ("breach", 0.95),
    ("ransomware", 0.95),
    ("zero-day", 0.95),
    ("zero day", 0.95),
    ("cve-", 0.90),
    ("vulnerability", 0.85),
    ("exploit", 0.85),
    ("ddos", 0.90),
    ("data loss", 0.85),
    ("incident", 0.70),
    ("degraded", 0.70),
    ("security patch", 0.75),
    ("end of life", 0.60),
    ("critical update", 0.75),
];

impl KeywordClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierUnavailable> {
        let lower = text.to_lowercase();
        let mut best = 0.0f64;
        let mut hits = 0u32;
        for (needle, weight) in VOCAB {
            if lower.contains(needle) {
                hits += 1;
                if *weight > best {
                    best = *weight;
                }
            }
        }
        // Extra distinct hits nudge confidence up, capped at 0.99.
        let score = if hits > 1 {
            (best + 0.02 * f64::from(hits - 1)).min(0.99)
        } else {
            best
        };
        Ok(Classification {
            is_relevant: score >= self.threshold,
            score,
        })
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

// ------------------------------------------------------------
// Test doubles (also usable from integration tests)
// ------------------------------------------------------------

/// Fixed-output classifier: first matching substring rule wins, otherwise
/// the fallback verdict applies.
pub struct StubClassifier {
    rules: Vec<(String, Classification)>,
    fallback: Classification,
}

impl StubClassifier {
    pub fn new(fallback: Classification) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    pub fn with_rule(mut self, needle: &str, verdict: Classification) -> Self {
        self.rules.push((needle.to_string(), verdict));
        self
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierUnavailable> {
        for (needle, verdict) in &self.rules {
            if text.contains(needle.as_str()) {
                return Ok(*verdict);
            }
        }
        Ok(self.fallback)
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Always reports the classifier as unavailable. For failure-path tests.
pub struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification, ClassifierUnavailable> {
        Err(ClassifierUnavailable::new("forced failure"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keyword_classifier_is_deterministic() {
        let c = KeywordClassifier::new(0.5);
        let a = c.classify("Major outage hits AWS us-east-1").await.unwrap();
        let b = c.classify("Major outage hits AWS us-east-1").await.unwrap();
        assert_eq!(a, b);
        assert!(a.is_relevant);
        assert!(a.score >= 0.9);
    }

    #[tokio::test]
    async fn keyword_classifier_filters_off_topic_text() {
        let c = KeywordClassifier::new(0.5);
        let v = c.classify("Local team wins championship game").await.unwrap();
        assert!(!v.is_relevant);
    }

    #[tokio::test]
    async fn adapter_assembles_title_before_body() {
        assert_eq!(classification_text("t", "b"), "t\nb");
        assert_eq!(classification_text("t", ""), "t");
    }

    #[tokio::test]
    async fn stub_rules_take_precedence_over_fallback() {
        let stub = StubClassifier::new(Classification {
            is_relevant: false,
            score: 0.1,
        })
        .with_rule(
            "outage",
            Classification {
                is_relevant: true,
                score: 0.95,
            },
        );
        let hit = stub.classify("big outage today").await.unwrap();
        assert!(hit.is_relevant);
        let miss = stub.classify("sports news").await.unwrap();
        assert!(!miss.is_relevant);
    }
}
