//! Liveness/readiness state shared between the worker and the HTTP API
//!
//! Uses atomics for lock-free read/write across tasks: the worker beats its
//! heartbeat on every tick, the supervisor records failures, and the probe
//! handler reads a consistent-enough snapshot without any locking.
//!
//! # Probe semantics
//! - `starting` until the HTTP listener is bound (`mark_ready`)
//! - `ok` while ready and, in worker mode, the heartbeat is fresh and the
//!   consecutive failure count is below the threshold
//! - `degraded` otherwise — the endpoint keeps answering with 503 so the
//!   orchestrator's retry contract decides when to restart the container

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::config::RunMode;

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn current_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Reported health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Process is up but not yet serving (listener not bound)
    Starting,
    /// Healthy
    Ok,
    /// Ready but the worker is failing or its heartbeat went stale
    Degraded,
}

/// JSON snapshot returned by `GET /healthz`
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub mode: RunMode,
    pub uptime_ms: u64,
    /// Age of the last worker heartbeat; absent in server mode
    pub heartbeat_age_ms: Option<u64>,
    pub consecutive_failures: u32,
    pub timestamp_ms: u64,
}

/// Shared health state, one instance per process
#[derive(Debug)]
pub struct HealthState {
    mode: RunMode,
    started_at_ms: u64,
    ready: AtomicBool,
    last_heartbeat_ms: AtomicU64,
    worker_failures: AtomicU32,
    heartbeat_stale_ms: u64,
    failure_threshold: u32,
}

impl HealthState {
    /// Create health state for the given run mode.
    ///
    /// The heartbeat is seeded with the construction time so a worker gets
    /// the full staleness window to produce its first tick.
    pub fn new(mode: RunMode, heartbeat_stale: Duration, failure_threshold: u32) -> Self {
        let now = current_time_ms();
        Self {
            mode,
            started_at_ms: now,
            ready: AtomicBool::new(false),
            last_heartbeat_ms: AtomicU64::new(now),
            worker_failures: AtomicU32::new(0),
            heartbeat_stale_ms: heartbeat_stale.as_millis() as u64,
            failure_threshold,
        }
    }

    /// Flip the readiness flag once the HTTP listener is bound
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Record a worker heartbeat tick
    pub fn beat(&self) {
        self.last_heartbeat_ms
            .store(current_time_ms(), Ordering::SeqCst);
    }

    /// Record a worker run failure, returning the new consecutive count
    pub fn record_worker_failure(&self) -> u32 {
        self.worker_failures.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Reset the consecutive failure count after a stable run segment
    pub fn reset_worker_failures(&self) {
        self.worker_failures.store(0, Ordering::SeqCst);
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// True iff the snapshot status is `Ok`
    pub fn is_healthy(&self) -> bool {
        self.snapshot().status == HealthStatus::Ok
    }

    /// Take a point-in-time snapshot for the probe handler
    pub fn snapshot(&self) -> HealthSnapshot {
        let now = current_time_ms();
        let failures = self.worker_failures.load(Ordering::SeqCst);

        let heartbeat_age_ms = match self.mode {
            RunMode::Server => None,
            RunMode::Worker => {
                Some(now.saturating_sub(self.last_heartbeat_ms.load(Ordering::SeqCst)))
            }
        };

        let status = if !self.ready.load(Ordering::SeqCst) {
            HealthStatus::Starting
        } else if failures >= self.failure_threshold {
            HealthStatus::Degraded
        } else if heartbeat_age_ms.is_some_and(|age| age > self.heartbeat_stale_ms) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Ok
        };

        HealthSnapshot {
            status,
            mode: self.mode,
            uptime_ms: now.saturating_sub(self.started_at_ms),
            heartbeat_age_ms,
            consecutive_failures: failures,
            timestamp_ms: now,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
