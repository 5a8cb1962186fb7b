// src/ingest/mod.rs
pub mod config;
pub mod error;
pub mod fetch;
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::ingest::error::ScrapeError;
use crate::ingest::types::Extracted;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "sampler_scrape_errors_total",
            "Fetch/shape/value errors per source."
        );
        describe_counter!(
            "sampler_scrape_items_total",
            "Observations forwarded to the registry per source."
        );
        describe_counter!("sampler_task_runs_total", "Completed sampler ticks.");
        describe_histogram!("sampler_parse_ms", "Page parse time in milliseconds.");
        describe_gauge!(
            "sampler_task_last_run_ts",
            "Unix ts when the sampler task last ran."
        );
        describe_gauge!(
            "produce_machine_status",
            "Simulated production machine load (percent)."
        );
        describe_counter!(
            "produce_api_status",
            "Simulated production API calls by url and status."
        );
        describe_histogram!(
            "produce_api_summary",
            "Simulated production API latency summary (seconds)."
        );
        describe_histogram!(
            "produce_api_histogram",
            "Simulated production API latency histogram (seconds)."
        );
        describe_gauge!("weibo_hotdata", "Weibo hot-search popularity per topic.");
        describe_gauge!("ncov_status", "Epidemic counts per province, city and type.");
    });
}

/// Log and count one acquisition error. Never escalates.
pub fn report(source: &'static str, err: &ScrapeError) {
    tracing::warn!(target: "ingest", source, kind = err.kind(), error = %err, "scrape error");
    counter!("sampler_scrape_errors_total", "source" => source, "kind" => err.kind()).increment(1);
}

/// Report the error part of an extraction (if any) and hand back the value.
pub fn settle<T>(source: &'static str, got: Extracted<T>) -> T {
    if let Some(e) = &got.error {
        report(source, e);
    }
    got.value
}
