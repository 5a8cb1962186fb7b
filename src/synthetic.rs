// src/synthetic.rs
//! Simulated production signals: machine load, API call counts and latency.
//! Generators take the RNG as a parameter so tests can seed it.

use async_trait::async_trait;
use rand::Rng;

use crate::ingest::scheduler::SampleJob;
use crate::ingest::types::Extracted;
use crate::sink::ObservationSink;

pub const MACHINE_METRIC: &str = "produce_machine_status";
pub const API_CALLS_METRIC: &str = "produce_api_status";
pub const API_SUMMARY_METRIC: &str = "produce_api_summary";
pub const API_HISTOGRAM_METRIC: &str = "produce_api_histogram";

/// Bucket bounds (seconds) for `produce_api_histogram`.
pub const LATENCY_BUCKETS: [f64; 7] = [0.01, 0.1, 1.0, 2.0, 5.0, 10.0, 30.0];
/// Quantiles rendered for summaries.
pub const SUMMARY_QUANTILES: [f64; 3] = [0.5, 0.9, 0.99];

/// CPU and memory load, each in [0, 100).
pub fn machine_status<R: Rng>(rng: &mut R) -> [(&'static str, f64); 2] {
    [
        ("cpu", rng.random::<f64>() * 100.0),
        ("memory", rng.random::<f64>() * 100.0),
    ]
}

/// Per-tick call increments as (url, ret, delta).
/// Searches are busy (10-19), adds are quiet (0-9), searches fail now and then (0-4).
pub fn api_calls<R: Rng>(rng: &mut R) -> [(&'static str, &'static str, u64); 3] {
    [
        ("/api/search", "200", rng.random_range(10..=19)),
        ("/api/add", "200", rng.random_range(0..=9)),
        ("/api/search", "500", rng.random_range(0..=4)),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyBand {
    /// 1-10s
    Normal,
    /// 61-120s
    Abnormal,
}

pub fn latency<R: Rng>(rng: &mut R, band: LatencyBand) -> f64 {
    match band {
        LatencyBand::Normal => rng.random_range(1u32..=10) as f64,
        LatencyBand::Abnormal => rng.random_range(61u32..=120) as f64,
    }
}

pub struct MachineStatusJob;

impl MachineStatusJob {
    pub fn emit<R: Rng>(sink: &dyn ObservationSink, rng: &mut R) -> usize {
        let samples = machine_status(rng);
        for (kind, value) in samples {
            sink.set_gauge(MACHINE_METRIC, &[("type", kind)], value);
        }
        samples.len()
    }
}

#[async_trait]
impl SampleJob for MachineStatusJob {
    fn name(&self) -> &'static str {
        "machine_status"
    }

    async fn tick(&self, sink: &dyn ObservationSink) -> Extracted<usize> {
        Extracted::ok(Self::emit(sink, &mut rand::rng()))
    }
}

pub struct ApiCallsJob;

impl ApiCallsJob {
    pub fn emit<R: Rng>(sink: &dyn ObservationSink, rng: &mut R) -> usize {
        let calls = api_calls(rng);
        for (url, ret, delta) in calls {
            sink.increment_counter(API_CALLS_METRIC, &[("url", url), ("ret", ret)], delta);
        }
        calls.len()
    }
}

#[async_trait]
impl SampleJob for ApiCallsJob {
    fn name(&self) -> &'static str {
        "api_calls"
    }

    async fn tick(&self, sink: &dyn ObservationSink) -> Extracted<usize> {
        Extracted::ok(Self::emit(sink, &mut rand::rng()))
    }
}

/// Feeds the same latency sample into the summary and the histogram.
/// The histogram series uses `l_`-prefixed label names.
pub struct LatencyJob {
    band: LatencyBand,
}

impl LatencyJob {
    pub fn new(band: LatencyBand) -> Self {
        Self { band }
    }

    pub fn emit<R: Rng>(&self, sink: &dyn ObservationSink, rng: &mut R) -> usize {
        let secs = latency(rng, self.band);
        sink.observe(
            API_SUMMARY_METRIC,
            &[("url", "/api/search"), ("ret", "200")],
            secs,
        );
        sink.observe(
            API_HISTOGRAM_METRIC,
            &[("l_url", "/api/search"), ("l_ret", "200")],
            secs,
        );
        2
    }
}

#[async_trait]
impl SampleJob for LatencyJob {
    fn name(&self) -> &'static str {
        match self.band {
            LatencyBand::Normal => "api_latency",
            LatencyBand::Abnormal => "api_latency_slow",
        }
    }

    async fn tick(&self, sink: &dyn ObservationSink) -> Extracted<usize> {
        Extracted::ok(self.emit(sink, &mut rand::rng()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ObservationKind, RecordingSink};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generators_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            for (_, v) in machine_status(&mut rng) {
                assert!((0.0..100.0).contains(&v));
            }
            let [search_ok, add_ok, search_err] = api_calls(&mut rng);
            assert!((10..=19).contains(&search_ok.2));
            assert!(add_ok.2 <= 9);
            assert!(search_err.2 <= 4);
            assert!((1.0..=10.0).contains(&latency(&mut rng, LatencyBand::Normal)));
            assert!((61.0..=120.0).contains(&latency(&mut rng, LatencyBand::Abnormal)));
        }
    }

    #[test]
    fn latency_job_feeds_summary_and_histogram() {
        let sink = RecordingSink::new();
        let mut rng = StdRng::seed_from_u64(1);
        LatencyJob::new(LatencyBand::Abnormal).emit(&sink, &mut rng);

        let obs = sink.snapshot();
        assert_eq!(obs.len(), 2);
        assert!(obs.iter().all(|o| o.kind == ObservationKind::Observe));
        assert_eq!(obs[0].value, obs[1].value);
        assert_eq!(obs[1].label("l_url"), Some("/api/search"));
    }

    #[test]
    fn api_calls_job_increments_three_series() {
        let sink = RecordingSink::new();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(ApiCallsJob::emit(&sink, &mut rng), 3);
        let failures: Vec<_> = sink
            .named(API_CALLS_METRIC)
            .into_iter()
            .filter(|o| o.label("ret") == Some("500"))
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, ObservationKind::CounterIncrement);
    }
}
