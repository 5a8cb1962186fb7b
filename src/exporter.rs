// src/exporter.rs
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use metrics_util::MetricKindMask;
use std::time::Duration;

use crate::synthetic::{API_HISTOGRAM_METRIC, LATENCY_BUCKETS, SUMMARY_QUANTILES};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

/// Exporter layout: summaries with fixed quantiles, except the latency
/// histogram which gets explicit buckets. Gauges untouched for `gauge_idle`
/// are dropped from the exposition.
pub fn builder(gauge_idle: Option<Duration>) -> Result<PrometheusBuilder, BuildError> {
    let builder = PrometheusBuilder::new()
        .set_quantiles(&SUMMARY_QUANTILES)?
        .set_buckets_for_metric(
            Matcher::Full(API_HISTOGRAM_METRIC.to_string()),
            &LATENCY_BUCKETS,
        )?;
    Ok(match gauge_idle {
        Some(idle) => builder.idle_timeout(MetricKindMask::GAUGE, Some(idle)),
        None => builder,
    })
}

impl Metrics {
    /// Install the global Prometheus recorder.
    pub fn init(gauge_idle: Option<Duration>) -> Result<Self, BuildError> {
        let handle = builder(gauge_idle)?.install_recorder()?;
        crate::ingest::ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        router(self.handle.clone())
    }
}

pub fn router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
}
