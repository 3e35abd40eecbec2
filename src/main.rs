//! Main entry point for the matchpoint matchmaking service
//!
//! Initializes and runs the matchmaking engine with its tick driver and
//! the health/metrics HTTP server, with proper error handling, logging,
//! and graceful shutdown.

use anyhow::Result;
use clap::Parser;
use matchpoint::config::AppConfig;
use matchpoint::engine::{MatchmakingEngine, TickDriver};
use matchpoint::metrics::{HealthServer, HealthServerConfig, MetricsCollector};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Matchpoint Matchmaking Service - skill-based queueing into balanced lobbies
#[derive(Parser)]
#[command(
    name = "matchpoint",
    version,
    about = "A skill-based matchmaking service for queueing players into balanced game lobbies",
    long_about = "Matchpoint runs per-mode matchmaking queues with wait-time based rating \
                 window expansion, forms full lobbies on a fixed tick, and computes Elo \
                 rating updates when matches complete."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Health/metrics port override
    #[arg(long, value_name = "PORT", help = "Override health server port")]
    health_port: Option<u16>,

    /// Tick interval override
    #[arg(long, value_name = "MS", help = "Override matching tick interval in milliseconds")]
    tick_ms: Option<u64>,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without starting service")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if let Some(port) = args.health_port {
        config.service.health_port = port;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.matchmaking.tick_interval_ms = tick_ms;
    }

    matchpoint::config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_logging(&config.service.log_level)?;

    if args.dry_run {
        info!("Configuration valid, exiting (dry run)");
        return Ok(());
    }

    info!(
        "Starting {} v{} (tick {}ms, eviction {}ms, reap {}ms)",
        config.service.name,
        matchpoint::VERSION,
        config.matchmaking.tick_interval_ms,
        config.matchmaking.max_queue_time_ms,
        config.matchmaking.lobby_timeout_ms
    );

    // Build the engine, its driver, and the monitoring server
    let metrics = Arc::new(MetricsCollector::new().unwrap_or_else(|e| {
        warn!("Failed to create metrics collector: {}, using default", e);
        MetricsCollector::default()
    }));
    let engine = Arc::new(MatchmakingEngine::with_metrics(
        config.engine_config(),
        Arc::clone(&metrics),
    ));
    let driver = TickDriver::new(Arc::clone(&engine), config.tick_interval());

    let health_server = Arc::new(HealthServer::new(
        HealthServerConfig {
            port: config.service.health_port,
            host: "0.0.0.0".to_string(),
        },
        metrics,
        Arc::clone(&engine),
    ));

    let health_task = {
        let server = Arc::clone(&health_server);
        tokio::spawn(async move {
            if let Err(e) = server.start().await {
                error!("Health server failed: {}", e);
            }
        })
    };

    driver.start();
    info!("Matchmaking service is running, press Ctrl+C to stop");

    signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping service...");

    driver.stop();
    health_server.stop();

    match tokio::time::timeout(config.shutdown_timeout(), health_task).await {
        Ok(_) => info!("Shutdown complete"),
        Err(_) => warn!("Health server did not stop within the shutdown timeout"),
    }

    let stats = engine.get_stats()?;
    info!(
        "Final stats: {} players queued, {} lobbies formed, {} matches completed",
        stats.players_queued, stats.lobbies_formed, stats.matches_completed
    );

    Ok(())
}
