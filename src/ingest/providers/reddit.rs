// src/ingest/providers/reddit.rs
//! Reddit listing provider (public `new.json` endpoint, no auth).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::ingest::types::{RawEvent, SourceProvider};

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}
#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}
#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}
#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    created_utc: f64,
}

pub struct RedditProvider {
    subreddit: String,
    source: String,
    limit: usize,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http(reqwest::Client),
}

impl RedditProvider {
    pub fn from_subreddit(subreddit: impl Into<String>, limit: usize) -> Self {
        let subreddit = subreddit.into();
        let client = reqwest::Client::builder()
            .user_agent("it-newsfeed/0.1")
            .build()
            .expect("reqwest client");
        Self {
            source: format!("reddit_{subreddit}"),
            subreddit,
            limit,
            mode: Mode::Http(client),
        }
    }

    pub fn from_fixture(subreddit: impl Into<String>, json: &str) -> Self {
        let subreddit = subreddit.into();
        Self {
            source: format!("reddit_{subreddit}"),
            subreddit,
            limit: 25,
            mode: Mode::Fixture(json.to_string()),
        }
    }

    fn parse_listing(&self, json: &str) -> Result<Vec<RawEvent>> {
        let listing: Listing = serde_json::from_str(json).context("parsing reddit listing")?;
        let mut out = Vec::with_capacity(listing.data.children.len());
        for child in listing.data.children.into_iter().take(self.limit) {
            let post = child.data;
            let published_at = DateTime::<Utc>::from_timestamp(post.created_utc as i64, 0)
                .map(|dt| dt.to_rfc3339());
            out.push(RawEvent {
                // Fullname convention: t3_<id> for link/self posts.
                id: Some(format!("t3_{}", post.id)),
                source: Some(self.source.clone()),
                title: Some(post.title),
                body: if post.selftext.trim().is_empty() {
                    None
                } else {
                    Some(post.selftext)
                },
                published_at,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RedditProvider {
    async fn fetch_batch(&self) -> Result<Vec<RawEvent>> {
        match &self.mode {
            Mode::Fixture(json) => self.parse_listing(json),
            Mode::Http(client) => {
                let url = format!(
                    "https://www.reddit.com/r/{}/new.json?limit={}",
                    self.subreddit, self.limit
                );
                // Fetch failures are counted by the caller; the provider
                // only reports them.
                let body = match client.get(&url).send().await {
                    Ok(resp) => resp.text().await.context("reddit http .text()")?,
                    Err(e) => {
                        tracing::warn!(error = ?e, source = %self.source, "reddit fetch error");
                        return Err(e).context("reddit http get()");
                    }
                };
                self.parse_listing(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.source
    }
}
