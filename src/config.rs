// src/config.rs
//! Service configuration: TOML file with env overrides.
//!
//! Load order: `$NEWSFEED_CONFIG_PATH`, then `config/newsfeed.toml`, then
//! built-in defaults. Individual env vars override whatever the file said.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/newsfeed.toml";

pub const ENV_CONFIG_PATH: &str = "NEWSFEED_CONFIG_PATH";
pub const ENV_BIND_ADDR: &str = "NEWSFEED_BIND_ADDR";
pub const ENV_STORE_PATH: &str = "NEWSFEED_STORE_PATH";
pub const ENV_CLASSIFIER_URL: &str = "NEWSFEED_CLASSIFIER_URL";
pub const ENV_SIMILARITY_THRESHOLD: &str = "NEWSFEED_SIMILARITY_THRESHOLD";
pub const ENV_RELEVANCE_THRESHOLD: &str = "NEWSFEED_RELEVANCE_THRESHOLD";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Near-duplicate similarity cutoff over normalized text.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Relevance cutoff used by the local keyword fallback classifier.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,
    /// When set, classification goes to this HTTP service.
    #[serde(default)]
    pub classifier_url: Option<String>,
    /// Per-item classify timeout; absent means no timeout.
    #[serde(default)]
    pub classify_timeout_secs: Option<u64>,
    /// Scheduler tick. 0 disables the scheduler even with providers set.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_item_limit")]
    pub item_limit_per_source: usize,
    #[serde(default)]
    pub rss_feeds: Vec<String>,
    #[serde(default)]
    pub subreddits: Vec<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_store_path() -> PathBuf {
    PathBuf::from("data/filtered_events.json")
}
fn default_similarity_threshold() -> f64 {
    crate::ingest::dedup::DEFAULT_SIMILARITY_THRESHOLD
}
fn default_relevance_threshold() -> f64 {
    0.5
}
fn default_poll_interval_secs() -> u64 {
    60
}
fn default_item_limit() -> usize {
    25
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str("").expect("empty config defaults")
    }
}

impl Config {
    /// Load from the default locations and apply env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            Self::from_path(Path::new(&p))?
        } else {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Self::from_path(default)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var(ENV_BIND_ADDR) {
            self.bind_addr = v;
        }
        if let Ok(v) = std::env::var(ENV_STORE_PATH) {
            self.store_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var(ENV_CLASSIFIER_URL) {
            if !v.trim().is_empty() {
                self.classifier_url = Some(v);
            }
        }
        if let Some(v) = parse_unit_env(ENV_SIMILARITY_THRESHOLD) {
            self.similarity_threshold = v;
        }
        if let Some(v) = parse_unit_env(ENV_RELEVANCE_THRESHOLD) {
            self.relevance_threshold = v;
        }
    }

    pub fn classify_timeout(&self) -> Option<std::time::Duration> {
        self.classify_timeout_secs
            .map(std::time::Duration::from_secs)
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_unit_env(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .map(|v| v.clamp(0.0, 1.0))
}
