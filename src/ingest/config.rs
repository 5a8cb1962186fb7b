// src/ingest/config.rs
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

pub const ENV_METRICS_ADDR: &str = "METRICS_ADDR";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_GAUGE_IDLE_SECS: &str = "METRICS_GAUGE_IDLE_SECS";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:2112";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GAUGE_IDLE_SECS: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Process-level knobs. Intervals, URLs and selectors are fixed and not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    pub metrics_addr: SocketAddr,
    pub fetch_timeout: Duration,
    /// `None` keeps gauges forever.
    pub gauge_idle: Option<Duration>,
    pub log_format: LogFormat,
}

impl SamplerConfig {
    /// Read from the process environment (after `.env`, if the caller loaded it).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr_raw = lookup(ENV_METRICS_ADDR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_METRICS_ADDR.to_string());
        let metrics_addr: SocketAddr = addr_raw
            .parse()
            .with_context(|| format!("{ENV_METRICS_ADDR}={addr_raw} is not a socket address"))?;

        let timeout_secs: u64 = lookup(ENV_FETCH_TIMEOUT_SECS)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
            .max(1);

        let idle_secs: u64 = lookup(ENV_GAUGE_IDLE_SECS)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_GAUGE_IDLE_SECS);

        let log_format = match lookup(ENV_LOG_FORMAT)
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        Ok(Self {
            metrics_addr,
            fetch_timeout: Duration::from_secs(timeout_secs),
            gauge_idle: (idle_secs > 0).then(|| Duration::from_secs(idle_secs)),
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;

    fn lookup_in(map: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |k| map.get(k).map(|v| v.to_string())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = SamplerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.metrics_addr, "0.0.0.0:2112".parse().unwrap());
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
        assert_eq!(cfg.gauge_idle, None);
        assert_eq!(cfg.log_format, LogFormat::Compact);
    }

    #[test]
    fn gauges_kept_forever_unless_idle_timeout_set() {
        let cfg = SamplerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.gauge_idle, None);

        let cfg = SamplerConfig::from_lookup(lookup_in(HashMap::from([(
            ENV_GAUGE_IDLE_SECS,
            "300",
        )])))
        .unwrap();
        assert_eq!(cfg.gauge_idle, Some(Duration::from_secs(300)));
    }

    #[test]
    fn overrides_and_clamping() {
        let cfg = SamplerConfig::from_lookup(lookup_in(HashMap::from([
            (ENV_METRICS_ADDR, "127.0.0.1:9100"),
            (ENV_FETCH_TIMEOUT_SECS, "0"),
            (ENV_GAUGE_IDLE_SECS, "0"),
            (ENV_LOG_FORMAT, "JSON"),
        ])))
        .unwrap();
        assert_eq!(cfg.metrics_addr.port(), 9100);
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(1));
        assert_eq!(cfg.gauge_idle, None);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn garbage_numbers_fall_back_to_defaults() {
        let cfg = SamplerConfig::from_lookup(lookup_in(HashMap::from([
            (ENV_FETCH_TIMEOUT_SECS, "soon"),
            (ENV_GAUGE_IDLE_SECS, "-4"),
        ])))
        .unwrap();
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
        assert_eq!(cfg.gauge_idle, None);
    }

    #[test]
    fn bad_address_is_an_error() {
        let err = SamplerConfig::from_lookup(lookup_in(HashMap::from([(
            ENV_METRICS_ADDR,
            "localhost",
        )])))
        .unwrap_err();
        assert!(err.to_string().contains("METRICS_ADDR"));
    }

    #[serial_test::serial]
    #[test]
    fn from_env_reads_process_environment() {
        env::set_var(ENV_METRICS_ADDR, "127.0.0.1:2999");
        let cfg = SamplerConfig::from_env().unwrap();
        assert_eq!(cfg.metrics_addr.port(), 2999);
        env::remove_var(ENV_METRICS_ADDR);
    }
}
