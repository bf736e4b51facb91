//! Sniper Bot — Entry Point
//!
//! Orchestrates:
//! 1. Env + config + logging initialization
//! 2. Health/metrics shared state
//! 3. axum health API server
//! 4. Supervised worker loop (worker mode)
//! 5. Ctrl+C / SIGTERM graceful shutdown
//!
//! Invocation contract:
//! - `sniper_bot`              → mode from `RUN_MODE` (default: server)
//! - `sniper_bot --worker`     → worker mode, overrides `RUN_MODE`
//! - `sniper_bot healthcheck`  → probe own /healthz, exit 0/1

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

use sniper_bot::config::{self, RunMode};
use sniper_bot::core::events::{log_system_event, SystemEvent};
use sniper_bot::core::health::HealthState;
use sniper_bot::core::metrics::Metrics;
use sniper_bot::core::supervisor;
use sniper_bot::core::worker::{TickWorker, WorkerContext};
use sniper_bot::server::{self, probe, AppState};

/// Shutdown broadcast capacity (single signal)
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;
/// Bounded wait for tasks to drain after the shutdown broadcast
const SHUTDOWN_GRACE_MS: u64 = 5_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // =========================================================================
    // 1. Env + argv
    // =========================================================================
    dotenvy::dotenv().ok();
    config::apply_env_aliases();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // Probe mode short-circuits everything else; the exit code is the contract
    if args.first().map(String::as_str) == Some("healthcheck") {
        let port = config::load_config_from_env()
            .map(|c| c.port)
            .unwrap_or(config::DEFAULT_PORT);
        match probe::run_probe(port).await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }

    config::init_logging();

    let cfg = match config::load_config_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Invalid configuration, refusing to start");
            std::process::exit(1);
        }
    };

    // The --worker flag forces worker mode regardless of RUN_MODE
    let mode = RunMode::resolve(&args, cfg.run_mode);

    // The grace period lives in the image HEALTHCHECK; a diverging config
    // value cannot take effect there, so surface it loudly
    if cfg.startup_grace_secs != probe::PROBE_START_PERIOD_SECS {
        warn!(
            configured_secs = cfg.startup_grace_secs,
            image_start_period_secs = probe::PROBE_START_PERIOD_SECS,
            "STARTUP_GRACE_SECS differs from the image HEALTHCHECK start period"
        );
    }

    log_system_event(&SystemEvent::bot_started());
    info!(
        mode = %mode,
        port = cfg.port,
        tick_ms = cfg.worker_tick_ms,
        "=== Sniper Bot Supervisor ==="
    );

    // =========================================================================
    // 2. Shared state + shutdown channel
    // =========================================================================
    let health = Arc::new(HealthState::new(
        mode,
        Duration::from_secs(cfg.heartbeat_stale_secs),
        cfg.restart.failure_threshold,
    ));
    let metrics = Arc::new(Metrics::default());
    let (shutdown_tx, _) = broadcast::channel(SHUTDOWN_CHANNEL_CAPACITY);

    // =========================================================================
    // 3. Health API server
    // =========================================================================
    let state = AppState {
        health: health.clone(),
        metrics: metrics.clone(),
    };
    let server_rx = shutdown_tx.subscribe();
    let port = cfg.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(state, port, server_rx).await {
            error!(error = %e, "Health API server failed");
        }
    });

    // =========================================================================
    // 4. Supervised worker loop (worker mode only)
    // =========================================================================
    let supervisor_handle = if mode == RunMode::Worker {
        let ctx = WorkerContext {
            health: health.clone(),
            metrics: metrics.clone(),
            tick_interval: Duration::from_millis(cfg.worker_tick_ms),
        };
        Some(tokio::spawn(supervisor::supervise(
            Arc::new(TickWorker),
            ctx,
            cfg.restart.clone(),
            shutdown_tx.clone(),
        )))
    } else {
        None
    };

    // =========================================================================
    // 5. Wait for Ctrl+C / SIGTERM → graceful shutdown
    // =========================================================================
    info!("Health endpoint: http://0.0.0.0:{}/healthz", cfg.port);

    shutdown_signal().await?;
    log_system_event(&SystemEvent::bot_shutdown());
    let _ = shutdown_tx.send(());

    let drain = async {
        if let Some(handle) = supervisor_handle {
            let _ = handle.await;
        }
        let _ = server_handle.await;
    };
    if timeout(Duration::from_millis(SHUTDOWN_GRACE_MS), drain)
        .await
        .is_err()
    {
        warn!("Shutdown grace elapsed with tasks still running");
    }

    info!("=== Shutdown complete ===");
    Ok(())
}

/// Resolve on Ctrl+C or, on unix, SIGTERM (what container runtimes send)
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = sigterm.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
