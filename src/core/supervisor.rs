//! Worker supervision with restart backoff
//!
//! Runs a `Worker` in its own task and restarts it on error or panic with
//! exponential backoff and jitter. Consecutive failures are recorded in
//! `HealthState`; once the failure threshold is reached the health endpoint
//! reports 503 and the container orchestrator's retry contract takes over.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::{sleep, Duration};
use tracing::{error, warn};

use crate::config::RestartConfig;
use crate::core::events::{log_system_event, SystemEvent};
use crate::core::worker::{Worker, WorkerContext};

/// Cap on the backoff exponent to keep the shift well-defined
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Jitter added to each backoff delay (0-199ms), anti-thundering-herd
const JITTER_RANGE_MS: u64 = 200;

/// Compute the backoff delay for the given consecutive failure count
fn backoff_delay_ms(restart: &RestartConfig, consecutive_failures: u32) -> u64 {
    let exponent = consecutive_failures
        .saturating_sub(1)
        .min(MAX_BACKOFF_EXPONENT);
    let base = restart
        .initial_delay_ms
        .saturating_mul(1u64 << exponent)
        .min(restart.max_delay_ms);
    base.saturating_add(rand::random::<u64>() % JITTER_RANGE_MS)
}

/// Supervise a worker until shutdown.
///
/// Each run gets a fresh shutdown receiver. A run ending in `Ok(())` is a
/// clean shutdown and ends supervision; `Err` and panics are failures that
/// trigger a backed-off restart.
pub async fn supervise(
    worker: Arc<dyn Worker>,
    ctx: WorkerContext,
    restart: RestartConfig,
    shutdown_tx: broadcast::Sender<()>,
) {
    log_system_event(&SystemEvent::task_started("supervisor"));

    // Long-lived receiver: holds a shutdown signal that arrives while a
    // failed run is being handled
    let mut shutdown_rx = shutdown_tx.subscribe();

    loop {
        let run_rx = shutdown_tx.subscribe();
        let run_worker = worker.clone();
        let run_ctx = ctx.clone();

        // Spawned so a panic surfaces as a JoinError instead of unwinding
        // through the supervisor
        let mut run_handle = tokio::spawn(async move { run_worker.run(run_ctx, run_rx).await });

        // A run that stays up past the stability window counts as recovered:
        // the failure count resets while the run is still alive, so a worker
        // that crash-looped and then came back does not hold /healthz at 503
        // for the rest of the run. A hung-but-alive run is still caught by
        // the heartbeat staleness gate in HealthState.
        let stable_timer = sleep(Duration::from_millis(restart.stable_run_ms));
        tokio::pin!(stable_timer);
        let mut stabilized = false;

        let joined = loop {
            tokio::select! {
                result = &mut run_handle => break result,
                _ = &mut stable_timer, if !stabilized => {
                    stabilized = true;
                    ctx.health.reset_worker_failures();
                }
            }
        };

        match joined {
            Ok(Ok(())) => {
                log_system_event(&SystemEvent::task_shutdown("supervisor", "worker_finished"));
                break;
            }
            Ok(Err(e)) => {
                warn!(worker = worker.name(), error = %e, "Worker run failed");
            }
            Err(e) => {
                error!(worker = worker.name(), error = %e, "Worker run panicked");
            }
        }

        ctx.metrics.inc_error();

        let failures = ctx.health.record_worker_failure();

        let backoff_ms = backoff_delay_ms(&restart, failures);
        warn!(
            worker = worker.name(),
            consecutive_failures = failures,
            backoff_ms = backoff_ms,
            "Restarting worker after backoff"
        );
        ctx.metrics.inc_restart();

        tokio::select! {
            _ = shutdown_rx.recv() => {
                log_system_event(&SystemEvent::task_shutdown("supervisor", "shutdown_signal"));
                break;
            }
            _ = sleep(Duration::from_millis(backoff_ms)) => {}
        }
    }

    log_system_event(&SystemEvent::task_stopped("supervisor"));
}
