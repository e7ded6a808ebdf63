//! hostmond - host metrics collector daemon.
//!
//! Samples temperature, memory, CPU and load from /proc and /sys on a fixed
//! interval and pushes them to VictoriaMetrics.

mod config;
mod logging;

use std::path::Path;
use std::time::{Duration, Instant as StdInstant};

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use hostmon_core::collector::{Collector, RealFs, SystemSampler};
use hostmon_core::config::MonitorConfig;
use hostmon_core::cycle::run_cycle;
use hostmon_core::ingest::IngestClient;

use config::{Args, EnvFile};

fn main() -> anyhow::Result<()> {
    // Before parsing, so file values reach the env fallbacks of `Args`.
    let env_file = config::load_env_file(Path::new(config::ENV_FILE));
    let args = Args::parse();

    logging::init(&args.log_settings())?;
    match env_file {
        Ok(EnvFile::Loaded(path)) => info!(path = %path.display(), "loaded environment file"),
        Ok(EnvFile::Missing) => {
            info!("No .env file found, using system environment variables")
        }
        Err(e) => warn!(error = %format!("{e:#}"), "ignoring environment file"),
    }
    if let (_, Some(unknown)) = args.log_level() {
        warn!(level = unknown, "unknown log level, using info");
    }

    let config = args.monitor_config()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(run(&args, config))
}

async fn run(args: &Args, config: MonitorConfig) -> anyhow::Result<()> {
    info!(
        version = hostmon_core::VERSION,
        environment = %args.environment,
        interval = %humantime::format_duration(config.collection_interval),
        cycle_timeout = %humantime::format_duration(config.cycle_timeout),
        database_type = %args.database_type,
        endpoint = %config.endpoint,
        "hostmond starting"
    );

    let sampler = SystemSampler::new(RealFs::new(), &config.proc_path, &config.sys_path)
        .with_cpu_interval(config.cpu_interval);
    if config.samplers.temperature && !sampler.has_thermal_zone() {
        warn!(
            path = %sampler.thermal_zone_path().display(),
            "temperature monitoring enabled but thermal zone not found"
        );
    }

    let collector = Collector::for_host(sampler, &config.samplers);
    let enabled = collector.enabled();
    if enabled.is_empty() {
        warn!("no monitors enabled, cycles will push nothing");
    } else {
        let names: Vec<&str> = enabled.iter().map(|kind| kind.name()).collect();
        info!(count = enabled.len(), monitors = %names.join(", "), "monitors enabled");
    }

    let client = IngestClient::new(config.endpoint.clone(), config.request_timeout)?;

    match client
        .ping(Instant::now() + config.startup_ping_timeout)
        .await
    {
        Ok(()) => info!("database connection test successful"),
        Err(e) => warn!(error = %e, "database connection test failed, continuing"),
    }

    // Setup graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    })
    .context("failed to set signal handler")?;

    let mut tick = cycle_ticker(config.collection_interval);

    info!("starting collection loop");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = tick.tick() => {}
        }

        let started = StdInstant::now();
        let deadline = Instant::now() + config.cycle_timeout;

        // Dropping the cycle future cancels any request in flight.
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("abandoning collection cycle");
                break;
            }
            result = run_cycle(&collector, &client, deadline) => match result {
                Ok(report) => debug!(
                    collected = report.collected,
                    pushed = report.pushed,
                    failed = report.failed.len(),
                    missing = report.missing.len(),
                    healthy = report.healthy,
                    duration_ms = report.elapsed.as_millis() as u64,
                    "collection cycle completed"
                ),
                Err(e) => error!(
                    error = %e,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "error collecting metrics"
                ),
            }
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// Ticker whose first tick fires one full `period` from now.
fn cycle_ticker(period: Duration) -> Interval {
    let mut tick = tokio::time::interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tick
}
