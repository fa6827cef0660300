//! Sigwatch - headless trading signal watcher
//!
//! Polls or streams market data for every watchlist entry, evaluates the
//! configured strategy policy each cycle and fans the resulting signals
//! out to the log, the CSV audit file and the status cache.
//!
//! # Usage
//! ```sh
//! WATCHLIST="frxXAUUSD:1h,cryBTCUSD:15m:stream" cargo run
//! ```
//!
//! # Environment Variables
//! - `WATCHLIST` - Comma separated `symbol:timeframe[:mode[:retention[:precision]]]` entries
//! - `STRATEGY` - Decision policy: fib_rsi, liquidity_grab, structure_shift, rsi_pips
//! - `POLL_INTERVAL_SECS` / `STREAM_THROTTLE_SECS` - Cycle pacing
//! - `SIGNAL_LOG_PATH` - CSV audit file location (default: signals.csv)
//! - `STATUS_INTERVAL_SECS` - Seconds between status summaries (default: 60)

use anyhow::Result;
use clap::Parser;
use sigwatch::application::scheduler::Scheduler;
use sigwatch::config::Config;
use sigwatch::infrastructure::SignalHub;
use sigwatch::infrastructure::sim::SimulatedMarketData;
use sigwatch::infrastructure::sinks::csv_audit::CsvAuditSink;
use sigwatch::infrastructure::sinks::latest_cache::LatestSignalCache;
use sigwatch::infrastructure::sinks::log::LogSink;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

const SIGNAL_QUEUE_CAPACITY: usize = 256;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Also record Hold outcomes in the CSV audit file
    #[arg(long)]
    audit: bool,

    /// Override the CSV audit file path from the environment
    #[arg(long)]
    log_path: Option<PathBuf>,

    /// Exit after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    duration_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Setup logging (stdout only)
    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();

    info!("Sigwatch {} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(path) = cli.log_path {
        config.signal_log_path = path;
    }
    info!(
        "Configuration loaded: strategy={}, {} watch entries, poll={}s, throttle={}s",
        config.strategy,
        config.watchlist.len(),
        config.poll_interval.as_secs(),
        config.stream_throttle.as_secs()
    );

    // Wire the signal fan-out
    let hub = SignalHub::new(SIGNAL_QUEUE_CAPACITY);
    hub.register(Arc::new(LogSink)).await;
    hub.register(Arc::new(CsvAuditSink::new(
        config.signal_log_path.clone(),
        cli.audit,
    )))
    .await;

    let cache = Arc::new(LatestSignalCache::new());
    hub.register(cache.clone()).await;

    // Periodic status summary from the cache. tokio interval panics on a
    // zero period, so the floor is one second
    let status_interval = std::env::var("STATUS_INTERVAL_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse::<u64>()
        .unwrap_or(60)
        .max(1);

    let status_cache = cache.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(status_interval));
        interval.tick().await;
        loop {
            interval.tick().await;
            let signals = status_cache.all();
            let actionable = signals.iter().filter(|s| s.is_actionable()).count();
            let stale = signals.iter().filter(|s| s.stale).count();
            info!(
                "Status: {} units reporting, {} actionable, {} stale",
                signals.len(),
                actionable,
                stale
            );
        }
    });

    // Start one work unit per watchlist entry
    let source = Arc::new(SimulatedMarketData::new());
    let scheduler = Scheduler::start(&config, source, hub.clone());
    info!(
        "Watching {} work units. Press Ctrl+C to shutdown.",
        scheduler.unit_count()
    );

    match cli.duration_secs {
        Some(secs) => {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            info!("Run duration elapsed. Exiting...");
        }
        None => {
            tokio::signal::ctrl_c().await?;
            info!("Shutdown signal received. Exiting...");
        }
    }

    scheduler.shutdown().await;
    if hub.dropped_count() > 0 {
        info!(
            "SignalHub dropped {} signals under backpressure",
            hub.dropped_count()
        );
    }
    Ok(())
}
