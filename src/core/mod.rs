//! Core process lifecycle: health state, metrics, worker seam, supervision

pub mod events;
pub mod health;
pub mod metrics;
pub mod supervisor;
pub mod worker;

pub use health::{HealthSnapshot, HealthState, HealthStatus};
pub use metrics::{Metrics, MetricsSnapshot};
pub use worker::{TickWorker, Worker, WorkerContext};
