// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod ingest;
pub mod exporter;
pub mod sink;
pub mod synthetic;

pub use crate::ingest::providers::ncov::fetch_epidemic_status;
pub use crate::ingest::providers::weibo::fetch_trending_topics;
pub use crate::ingest::types::{CityStatus, Extracted, PageFetcher, TopicPopularity};
pub use crate::sink::{MetricsSink, ObservationSink};

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::ingest::config::SamplerConfig;
use crate::ingest::fetch::HttpFetcher;
use crate::ingest::scheduler::{default_schedule, spawn_all};

/// Start every sampler task and serve `/metrics` until the listener fails.
pub async fn run(cfg: SamplerConfig) -> anyhow::Result<()> {
    let metrics = crate::exporter::Metrics::init(cfg.gauge_idle)
        .context("install prometheus recorder")?;

    let fetcher = HttpFetcher::new(cfg.fetch_timeout).context("build http client")?;
    let sink: Arc<dyn ObservationSink> = Arc::new(MetricsSink);
    let tasks = spawn_all(default_schedule(Arc::new(fetcher)), sink);
    tracing::info!(tasks = tasks.len(), "samplers running");

    let listener = TcpListener::bind(cfg.metrics_addr)
        .await
        .with_context(|| format!("bind {}", cfg.metrics_addr))?;
    tracing::info!(addr = %cfg.metrics_addr, "serving /metrics");

    axum::serve(listener, metrics.router())
        .await
        .context("metrics server")?;
    Ok(())
}
