// src/ingest/types.rs
use std::collections::BTreeMap;

use crate::ingest::error::{Result, ScrapeError};

/// Per-city counts from one epidemic-status fetch.
#[derive(Debug, Clone, serde::Serialize, PartialEq, Eq)]
pub struct CityStatus {
    pub province: String,
    pub city: String,
    pub confirmed: u64, // "患病"
    pub suspected: u64, // "待确认"
    pub cured: u64,
    pub dead: u64,
}

/// Snapshot of topic -> popularity for one trending-topics fetch.
pub type TopicPopularity = BTreeMap<String, u64>;

/// Outcome of one extraction: what was accumulated before any fault,
/// plus the fault itself if extraction stopped early.
#[derive(Debug, Default)]
pub struct Extracted<T> {
    pub value: T,
    pub error: Option<ScrapeError>,
}

impl<T> Extracted<T> {
    pub fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    pub fn partial(value: T, error: ScrapeError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }
}

impl<T: Default> Extracted<T> {
    pub fn failed(error: ScrapeError) -> Self {
        Self::partial(T::default(), error)
    }
}

/// Narrow view of the HTTP client: GET a URL, hand back the raw body.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>>;
}
