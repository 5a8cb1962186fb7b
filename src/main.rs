//! monitor-sampler — binary entrypoint.
//! Loads env config, sets up tracing, then hands over to `monitor_sampler::run`.

use monitor_sampler::ingest::config::{LogFormat, SamplerConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("monitor_sampler=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    let cfg = SamplerConfig::from_env()?;
    init_tracing(cfg.log_format);
    tracing::info!(?cfg, "monitor-sampler starting");

    monitor_sampler::run(cfg).await
}
