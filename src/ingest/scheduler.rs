// src/ingest/scheduler.rs
//! Fixed set of independent periodic samplers.
//!
//! Every task owns its interval, its job and a handle to the sink; nothing
//! else is shared. A slow fetch in one task only delays that task's own
//! next tick (missed ticks are skipped, never run back-to-back).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ingest::providers::{ncov::NcovJob, weibo::WeiboJob};
use crate::ingest::types::{Extracted, PageFetcher};
use crate::sink::ObservationSink;
use crate::synthetic::{ApiCallsJob, LatencyBand, LatencyJob, MachineStatusJob};

pub const FAST_INTERVAL: Duration = Duration::from_secs(15);
pub const SLOW_INTERVAL: Duration = Duration::from_secs(60);

/// One acquisition per tick. `value` is the number of observations forwarded;
/// `error` is whatever stopped the acquisition early.
#[async_trait]
pub trait SampleJob: Send + Sync {
    fn name(&self) -> &'static str;
    async fn tick(&self, sink: &dyn ObservationSink) -> Extracted<usize>;
}

#[derive(Clone)]
pub struct PeriodicTask {
    pub interval: Duration,
    pub job: Arc<dyn SampleJob>,
}

impl PeriodicTask {
    pub fn new(interval: Duration, job: Arc<dyn SampleJob>) -> Self {
        Self { interval, job }
    }
}

/// The production line-up: four synthetic sources plus the two scrapers.
pub fn default_schedule(fetcher: Arc<dyn PageFetcher>) -> Vec<PeriodicTask> {
    vec![
        PeriodicTask::new(FAST_INTERVAL, Arc::new(MachineStatusJob)),
        PeriodicTask::new(FAST_INTERVAL, Arc::new(ApiCallsJob)),
        PeriodicTask::new(FAST_INTERVAL, Arc::new(LatencyJob::new(LatencyBand::Normal))),
        PeriodicTask::new(SLOW_INTERVAL, Arc::new(LatencyJob::new(LatencyBand::Abnormal))),
        PeriodicTask::new(FAST_INTERVAL, Arc::new(WeiboJob::new(fetcher.clone()))),
        PeriodicTask::new(SLOW_INTERVAL, Arc::new(NcovJob::new(fetcher))),
    ]
}

/// Run one tick of `job`: forward, then log/count any error. Never fails.
pub async fn run_cycle(job: &dyn SampleJob, sink: &dyn ObservationSink) -> usize {
    let task = job.name();
    let got = job.tick(sink).await;
    let now = chrono::Utc::now().timestamp().max(0) as u64;

    if let Some(e) = &got.error {
        crate::ingest::report(task, e);
    }

    counter!("sampler_scrape_items_total", "source" => task).increment(got.value as u64);
    counter!("sampler_task_runs_total", "task" => task).increment(1);
    gauge!("sampler_task_last_run_ts", "task" => task).set(now as f64);

    tracing::debug!(target: "ingest", task, forwarded = got.value, "sampler tick");
    got.value
}

/// Spawn one task on its own timer. The first tick fires immediately.
pub fn spawn_periodic(task: PeriodicTask, sink: Arc<dyn ObservationSink>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(task.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            run_cycle(task.job.as_ref(), sink.as_ref()).await;
        }
    })
}

pub fn spawn_all(schedule: Vec<PeriodicTask>, sink: Arc<dyn ObservationSink>) -> Vec<JoinHandle<()>> {
    crate::ingest::ensure_metrics_described();
    schedule
        .into_iter()
        .map(|task| {
            tracing::info!(
                target: "ingest",
                task = task.job.name(),
                interval_secs = task.interval.as_secs(),
                "starting sampler"
            );
            spawn_periodic(task, sink.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fetch::FixtureFetcher;

    #[test]
    fn default_schedule_has_expected_cadence() {
        let schedule = default_schedule(Arc::new(FixtureFetcher::failing()));
        let cadence: Vec<(&str, u64)> = schedule
            .iter()
            .map(|t| (t.job.name(), t.interval.as_secs()))
            .collect();
        assert_eq!(
            cadence,
            vec![
                ("machine_status", 15),
                ("api_calls", 15),
                ("api_latency", 15),
                ("api_latency_slow", 60),
                ("weibo", 15),
                ("ncov", 60),
            ]
        );
    }
}
