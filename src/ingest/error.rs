// src/ingest/error.rs
use thiserror::Error;

/// Everything that can go wrong while acquiring one sample.
/// None of these are fatal; the owning task logs and waits for its next tick.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("response body was empty")]
    EmptyBody,

    #[error("unexpected page shape: {0}")]
    Shape(String),

    #[error("invalid value: {0}")]
    Value(String),
}

impl ScrapeError {
    /// Short label used on `sampler_scrape_errors_total{kind=...}`.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Fetch(_) => "fetch",
            ScrapeError::EmptyBody => "empty",
            ScrapeError::Shape(_) => "shape",
            ScrapeError::Value(_) => "value",
        }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(e: reqwest::Error) -> Self {
        ScrapeError::Fetch(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
