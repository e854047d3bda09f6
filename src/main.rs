//! TrafficWatch - Real-Time DDoS Detection Monitor
//!
//! Polls a remote traffic-classification service and maintains live
//! attack/normal statistics: cumulative totals plus a rolling window of
//! per-tick counts, published to subscribers after every poll.
//!
//! # Usage
//!
//! ```bash
//! # Poll the default local classifier every 2 seconds
//! cargo run --release
//!
//! # Point at a remote classifier, poll every 500 ms
//! cargo run --release -- --url http://classifier.internal:5000 --interval-ms 500
//! ```
//!
//! # Environment Variables
//!
//! - `TRAFFICWATCH_BACKEND_URL`: classification service base URL override
//! - `TRAFFICWATCH_CONFIG`: path to a monitor_config.toml
//! - `RUST_LOG`: logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use trafficwatch::config::{self, MonitorConfig};
use trafficwatch::{Aggregator, Poller, PredictClient, Snapshot};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "trafficwatch")]
#[command(about = "Real-Time DDoS Detection Monitor")]
#[command(version)]
struct CliArgs {
    /// Classification service base URL
    /// (overrides config file and built-in default)
    #[arg(long, env = "TRAFFICWATCH_BACKEND_URL")]
    url: Option<String>,

    /// Polling interval in milliseconds
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Path to a monitor_config.toml (default: search order in docs)
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    // Load monitor configuration, then apply CLI/env overrides
    let mut monitor_config = match &args.config {
        Some(path) => MonitorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MonitorConfig::load(),
    };
    if let Some(url) = args.url {
        monitor_config.service.base_url = url;
    }
    if let Some(interval_ms) = args.interval_ms {
        monitor_config.poller.interval_ms = interval_ms;
    }
    monitor_config
        .validate()
        .context("Invalid monitor configuration")?;

    config::init(monitor_config);
    let cfg = config::get();
    let base_url = cfg.service.base_url.as_str();
    let interval = Duration::from_millis(cfg.poller.interval_ms);

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  TrafficWatch - Real-Time DDoS Detection Monitor");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("");
    info!("🎯 Service:  {}", base_url);
    info!("⏱️  Interval: {}ms", interval.as_millis());
    info!("");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let aggregator = Arc::new(Aggregator::new());

    // Snapshot logger — the bundled consumer. Any other consumer (UI,
    // metrics exporter) attaches the same way, via subscribe().
    let logger_rx = aggregator.subscribe();
    let logger_token = cancel_token.clone();
    let logger = tokio::spawn(run_snapshot_logger(logger_rx, logger_token));

    let client = PredictClient::new(base_url);
    let poller = Poller::new(client, Arc::clone(&aggregator), interval, cancel_token);
    let stats = poller.run().await;

    logger.await.ok();

    // Final statistics
    let snapshot = aggregator.snapshot();
    info!("");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("📊 FINAL STATISTICS");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("   Ticks Fired:       {}", stats.ticks_fired);
    info!("   Ticks Skipped:     {}", stats.ticks_skipped);
    info!("   Requests Issued:   {}", stats.requests_issued);
    info!("   Batches Applied:   {}", stats.batches_applied);
    info!("   Polls Failed:      {}", stats.polls_failed);
    info!("   Total Attacks:     {}", snapshot.totals.total_attacks);
    info!("   Total Normal:      {}", snapshot.totals.total_normal);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("");
    info!("✓ TrafficWatch shutdown complete");
    Ok(())
}

// ============================================================================
// Snapshot Logger
// ============================================================================

/// Log every published snapshot: per-tick counts plus running totals, or the
/// error when a poll failed. Aggregated data is always shown even while the
/// service is failing — stale-but-valid beats a blank display.
async fn run_snapshot_logger(mut rx: watch::Receiver<Snapshot>, cancel_token: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let snapshot = rx.borrow_and_update().clone();
        match (&snapshot.last_error, snapshot.latest()) {
            (Some(error), _) => {
                warn!(
                    error = %error,
                    total_attacks = snapshot.totals.total_attacks,
                    total_normal = snapshot.totals.total_normal,
                    "⚠️  Poll failed"
                );
            }
            (None, Some(tick)) => {
                info!(
                    ddos = tick.attack_count,
                    normal = tick.normal_count,
                    total_attacks = snapshot.totals.total_attacks,
                    total_normal = snapshot.totals.total_normal,
                    window = snapshot.window.len(),
                    "📊 Tick"
                );
            }
            (None, None) => {}
        }
    }
}
