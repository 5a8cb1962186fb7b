// src/ingest/providers/ncov.rs
//! Epidemic-status scraper.
//!
//! The page ships its data as a JavaScript assignment inside a `try { ... }catch(e){}`
//! block, so the JSON is cut out by searching the raw bytes for two fixed anchors.
//! Searching bytes (not a decoded `String`) keeps the offsets exact no matter what
//! multi-byte text surrounds the payload.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use metrics::histogram;
use serde::Deserialize;

use crate::ingest::error::{Result, ScrapeError};
use crate::ingest::scheduler::SampleJob;
use crate::ingest::types::{CityStatus, Extracted, PageFetcher};
use crate::sink::ObservationSink;

pub const SOURCE: &str = "ncov";
pub const NCOV_URL: &str = "https://3g.dxy.cn/newh5/view/pneumonia";
pub const NCOV_METRIC: &str = "ncov_status";

const OPEN_ANCHOR: &[u8] = br#"[{"provinceName""#;
const CLOSE_ANCHOR: &[u8] = b"}catch(e){}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProvinceRecord {
    province_name: String,
    cities: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CityRecord {
    city_name: String,
    confirmed_count: f64,
    suspected_count: f64,
    cured_count: f64,
    dead_count: f64,
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Byte span of the embedded array: from the opening `[` up to (not including)
/// the `}` that starts the closing anchor.
pub fn embedded_payload(body: &[u8]) -> Result<&[u8]> {
    let start = find(body, OPEN_ANCHOR)
        .ok_or_else(|| ScrapeError::Shape("opening anchor not found".into()))?;
    let rel_end = find(&body[start + 1..], CLOSE_ANCHOR)
        .ok_or_else(|| ScrapeError::Shape("closing anchor not found".into()))?;
    Ok(&body[start..start + 1 + rel_end])
}

/// Non-negative, finite, truncated toward zero.
fn count(field: &str, v: f64) -> Result<u64> {
    if !v.is_finite() || v < 0.0 {
        return Err(ScrapeError::Value(format!("{field} = {v}")));
    }
    Ok(v.trunc() as u64)
}

fn city_status(province: &str, raw: serde_json::Value) -> Result<CityStatus> {
    let rec: CityRecord = serde_json::from_value(raw)
        .map_err(|e| ScrapeError::Shape(format!("city record in {province}: {e}")))?;
    Ok(CityStatus {
        province: province.to_string(),
        city: rec.city_name,
        confirmed: count("confirmedCount", rec.confirmed_count)?,
        suspected: count("suspectedCount", rec.suspected_count)?,
        cured: count("curedCount", rec.cured_count)?,
        dead: count("deadCount", rec.dead_count)?,
    })
}

/// Parse a raw page body. Stops at the first malformed record and returns
/// everything accumulated before it together with the error.
pub fn parse_epidemic_status(body: &[u8]) -> Extracted<Vec<CityStatus>> {
    let payload = match embedded_payload(body) {
        Ok(p) => p,
        Err(e) => return Extracted::failed(e),
    };

    let provinces: Vec<serde_json::Value> = match serde_json::from_slice(payload) {
        Ok(v) => v,
        Err(e) => {
            return Extracted::failed(ScrapeError::Shape(format!(
                "embedded payload is not a JSON array: {e}"
            )))
        }
    };

    let mut out = Vec::new();
    for raw in provinces {
        let province: ProvinceRecord = match serde_json::from_value(raw) {
            Ok(p) => p,
            Err(e) => {
                return Extracted::partial(
                    out,
                    ScrapeError::Shape(format!("province record: {e}")),
                )
            }
        };
        for city in province.cities {
            match city_status(&province.province_name, city) {
                Ok(status) => out.push(status),
                Err(e) => return Extracted::partial(out, e),
            }
        }
    }
    Extracted::ok(out)
}

/// Fetch + parse, without logging. Fetch failures come back as an empty result.
pub async fn acquire(fetcher: &dyn PageFetcher) -> Extracted<Vec<CityStatus>> {
    let body = match fetcher.fetch(NCOV_URL, &[]).await {
        Ok(b) => b,
        Err(e) => return Extracted::failed(e),
    };

    let t0 = Instant::now();
    let out = parse_epidemic_status(&body);
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("sampler_parse_ms", "source" => SOURCE).record(ms);
    out
}

/// One fetch of the epidemic-status page. Errors are logged and counted;
/// the caller only ever sees the (possibly empty) list.
pub async fn fetch_epidemic_status(fetcher: &dyn PageFetcher) -> Vec<CityStatus> {
    crate::ingest::settle(SOURCE, acquire(fetcher).await)
}

/// Four gauges per city, keyed by province/city/type.
pub fn forward(sink: &dyn ObservationSink, rows: &[CityStatus]) -> usize {
    for row in rows {
        for (kind, value) in [
            ("患病", row.confirmed),
            ("治愈", row.cured),
            ("待确认", row.suspected),
            ("死亡", row.dead),
        ] {
            sink.set_gauge(
                NCOV_METRIC,
                &[
                    ("province", row.province.as_str()),
                    ("city", row.city.as_str()),
                    ("type", kind),
                ],
                value as f64,
            );
        }
    }
    rows.len() * 4
}

pub struct NcovJob {
    fetcher: Arc<dyn PageFetcher>,
}

impl NcovJob {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl SampleJob for NcovJob {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn tick(&self, sink: &dyn ObservationSink) -> Extracted<usize> {
        let got = acquire(self.fetcher.as_ref()).await;
        let n = forward(sink, &got.value);
        Extracted {
            value: n,
            error: got.error,
        }
    }
}
