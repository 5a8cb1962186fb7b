// src/ingest/fetch.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;

use crate::ingest::error::{Result, ScrapeError};
use crate::ingest::types::PageFetcher;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// `reqwest`-backed fetcher with a hard per-request timeout.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>> {
        let mut map = HeaderMap::new();
        map.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        for (k, v) in headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .map_err(|e| ScrapeError::Fetch(format!("bad header name {k}: {e}")))?;
            let value = HeaderValue::from_str(v)
                .map_err(|e| ScrapeError::Fetch(format!("bad header value for {k}: {e}")))?;
            map.insert(name, value);
        }

        let resp = self.client.get(url).headers(map).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Fetch(format!("GET {url} returned {status}")));
        }

        let body = resp.bytes().await?;
        if body.is_empty() {
            return Err(ScrapeError::EmptyBody);
        }
        Ok(body.to_vec())
    }
}

// --- Test helper ---
/// Serves the same canned body for every URL; counts calls.
pub struct FixtureFetcher {
    body: Option<Vec<u8>>,
    pub calls: std::sync::atomic::AtomicUsize,
}

impl FixtureFetcher {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Some(body.into()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A fetcher whose every call fails at the transport level.
    pub fn failing() -> Self {
        Self {
            body: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str, _headers: &[(&str, &str)]) -> Result<Vec<u8>> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.body {
            Some(b) if b.is_empty() => Err(ScrapeError::EmptyBody),
            Some(b) => Ok(b.clone()),
            None => Err(ScrapeError::Fetch(format!("fixture refused {url}"))),
        }
    }
}
