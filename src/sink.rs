// src/sink.rs
//! Observation sink: the only shared, mutable thing the sampler tasks touch.
//! `MetricsSink` forwards into the global `metrics` recorder, which is
//! thread-safe on its own, so callers never lock anything.

use metrics::{counter, gauge, histogram, Label};
use std::sync::Mutex;

/// Ordered (label name, label value) pairs; name + labels identify one series.
pub type Labels<'a> = &'a [(&'a str, &'a str)];

pub trait ObservationSink: Send + Sync {
    fn set_gauge(&self, name: &'static str, labels: Labels<'_>, value: f64);
    fn increment_counter(&self, name: &'static str, labels: Labels<'_>, delta: u64);
    /// Summary/histogram observation; which of the two is decided by the exporter.
    fn observe(&self, name: &'static str, labels: Labels<'_>, value: f64);
}

fn to_labels(labels: Labels<'_>) -> Vec<Label> {
    labels
        .iter()
        .map(|(k, v)| Label::new(k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSink;

impl ObservationSink for MetricsSink {
    fn set_gauge(&self, name: &'static str, labels: Labels<'_>, value: f64) {
        gauge!(name, to_labels(labels)).set(value);
    }

    fn increment_counter(&self, name: &'static str, labels: Labels<'_>, delta: u64) {
        counter!(name, to_labels(labels)).increment(delta);
    }

    fn observe(&self, name: &'static str, labels: Labels<'_>, value: f64) {
        histogram!(name, to_labels(labels)).record(value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationKind {
    GaugeSet,
    CounterIncrement,
    Observe,
}

/// One delivered observation, as captured by `RecordingSink`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: &'static str,
    pub labels: Vec<(String, String)>,
    pub value: f64,
    pub kind: ObservationKind,
}

impl Observation {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// --- Test helper ---
/// Keeps every observation in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub observations: Mutex<Vec<Observation>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Observation> {
        self.observations
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    pub fn named(&self, name: &str) -> Vec<Observation> {
        self.snapshot()
            .into_iter()
            .filter(|o| o.name == name)
            .collect()
    }

    fn push(&self, name: &'static str, labels: Labels<'_>, value: f64, kind: ObservationKind) {
        if let Ok(mut v) = self.observations.lock() {
            v.push(Observation {
                name,
                labels: labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                value,
                kind,
            });
        }
    }
}

impl ObservationSink for RecordingSink {
    fn set_gauge(&self, name: &'static str, labels: Labels<'_>, value: f64) {
        self.push(name, labels, value, ObservationKind::GaugeSet);
    }

    fn increment_counter(&self, name: &'static str, labels: Labels<'_>, delta: u64) {
        self.push(name, labels, delta as f64, ObservationKind::CounterIncrement);
    }

    fn observe(&self, name: &'static str, labels: Labels<'_>, value: f64) {
        self.push(name, labels, value, ObservationKind::Observe);
    }
}
