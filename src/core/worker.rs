//! Worker seam and the built-in heartbeat worker
//!
//! `Worker` is the slot a real trading strategy drops into later: a
//! long-running task that beats the shared heartbeat and returns `Ok(())`
//! only on clean shutdown. The shipped `TickWorker` does exactly the
//! lifecycle part — heartbeat ticks and shutdown handling — and nothing else.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};
use tracing::debug;

use crate::core::events::{log_system_event, SystemEvent};
use crate::core::health::HealthState;
use crate::core::metrics::Metrics;
use crate::error::Result;

/// Log throttle — emit a heartbeat debug line every N ticks
const LOG_THROTTLE_TICKS: u64 = 60;

/// Shared handles a worker run needs
#[derive(Debug, Clone)]
pub struct WorkerContext {
    pub health: Arc<HealthState>,
    pub metrics: Arc<Metrics>,
    /// Heartbeat tick interval
    pub tick_interval: Duration,
}

/// A supervised long-running task.
///
/// Contract: `run` blocks until a shutdown signal arrives (return `Ok(())`)
/// or an unrecoverable error occurs (return `Err`). The supervisor restarts
/// failed runs with backoff; a panic inside `run` is treated as a failure.
#[async_trait]
pub trait Worker: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: WorkerContext, shutdown_rx: broadcast::Receiver<()>) -> Result<()>;
}

/// Built-in worker: beats the heartbeat on a fixed interval.
///
/// Placeholder for the trading loop — it exercises the full supervision and
/// health contract without any exchange connectivity.
#[derive(Debug, Default)]
pub struct TickWorker;

#[async_trait]
impl Worker for TickWorker {
    fn name(&self) -> &'static str {
        "tick"
    }

    async fn run(
        &self,
        ctx: WorkerContext,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        log_system_event(&SystemEvent::task_started("worker"));

        let mut tick = interval(ctx.tick_interval);
        let mut tick_count: u64 = 0;

        loop {
            tokio::select! {
                // Shutdown takes priority
                _ = shutdown_rx.recv() => {
                    log_system_event(&SystemEvent::task_shutdown("worker", "shutdown_signal"));
                    return Ok(());
                }
                _ = tick.tick() => {
                    tick_count += 1;
                    ctx.health.beat();
                    ctx.metrics.inc_tick();

                    if tick_count % LOG_THROTTLE_TICKS == 0 {
                        debug!(ticks = tick_count, "Worker heartbeat");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunMode;
    use tokio::time::timeout;

    fn test_ctx(tick_ms: u64) -> WorkerContext {
        WorkerContext {
            health: Arc::new(HealthState::new(
                RunMode::Worker,
                Duration::from_secs(60),
                3,
            )),
            metrics: Arc::new(Metrics::default()),
            tick_interval: Duration::from_millis(tick_ms),
        }
    }

    #[tokio::test]
    async fn test_tick_worker_beats_and_counts() {
        let ctx = test_ctx(10);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let worker = TickWorker;
        let run_ctx = ctx.clone();
        let handle = tokio::spawn(async move { worker.run(run_ctx, shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(80)).await;
        shutdown_tx.send(()).unwrap();

        let result = timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok(), "Worker should shutdown cleanly");
        assert!(result.unwrap().unwrap().is_ok());
        assert!(ctx.metrics.worker_ticks() >= 2, "Worker should have ticked");
    }

    #[tokio::test]
    async fn test_tick_worker_shutdown_before_first_tick() {
        let ctx = test_ctx(10_000);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let worker = TickWorker;
        let handle = tokio::spawn(async move { worker.run(ctx, shutdown_rx).await });

        shutdown_tx.send(()).unwrap();
        let result = timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok(), "Shutdown must win over a long tick interval");
    }
}
