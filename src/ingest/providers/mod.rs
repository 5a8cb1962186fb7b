// src/ingest/providers/mod.rs
pub mod ncov;
pub mod weibo;
