// src/ingest/providers/mod.rs
pub mod mock;
pub mod reddit;
pub mod rss;
