//! Process counters exposed via `GET /metrics`
//!
//! Plain atomic counters, snapshotted into JSON on demand. The counter
//! vocabulary (ticks, restarts, errors, probes) is the operational minimum
//! for a supervised worker; a strategy implementation would extend it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::core::health::current_time_ms;

/// Shared process counters, one instance per process
#[derive(Debug, Default)]
pub struct Metrics {
    worker_ticks: AtomicU64,
    worker_restarts: AtomicU64,
    worker_errors: AtomicU64,
    health_probes: AtomicU64,
}

/// JSON snapshot returned by `GET /metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub worker_ticks_total: u64,
    pub worker_restarts_total: u64,
    pub worker_errors_total: u64,
    pub health_probes_total: u64,
    pub timestamp_ms: u64,
}

impl Metrics {
    pub fn inc_tick(&self) {
        self.worker_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_restart(&self) {
        self.worker_restarts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_error(&self) {
        self.worker_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_probe(&self) {
        self.health_probes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn worker_restarts(&self) -> u64 {
        self.worker_restarts.load(Ordering::Relaxed)
    }

    pub fn worker_ticks(&self) -> u64 {
        self.worker_ticks.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            worker_ticks_total: self.worker_ticks.load(Ordering::Relaxed),
            worker_restarts_total: self.worker_restarts.load(Ordering::Relaxed),
            worker_errors_total: self.worker_errors.load(Ordering::Relaxed),
            health_probes_total: self.health_probes.load(Ordering::Relaxed),
            timestamp_ms: current_time_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = Metrics::default();
        let snap = metrics.snapshot();
        assert_eq!(snap.worker_ticks_total, 0);
        assert_eq!(snap.worker_restarts_total, 0);
        assert_eq!(snap.worker_errors_total, 0);
        assert_eq!(snap.health_probes_total, 0);
    }

    #[test]
    fn test_increments_land_in_snapshot() {
        let metrics = Metrics::default();
        metrics.inc_tick();
        metrics.inc_tick();
        metrics.inc_restart();
        metrics.inc_error();
        metrics.inc_probe();

        let snap = metrics.snapshot();
        assert_eq!(snap.worker_ticks_total, 2);
        assert_eq!(snap.worker_restarts_total, 1);
        assert_eq!(snap.worker_errors_total, 1);
        assert_eq!(snap.health_probes_total, 1);
    }

    #[test]
    fn test_snapshot_serializes_with_total_suffix() {
        let metrics = Metrics::default();
        metrics.inc_tick();
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["worker_ticks_total"], 1);
        assert!(json["timestamp_ms"].as_u64().unwrap() > 0);
    }
}
