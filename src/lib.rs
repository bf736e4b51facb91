//! Sniper Bot — process supervisor core
//!
//! Containerized lifecycle scaffolding for a long-running trading worker:
//! - Typed environment configuration, loaded once at startup
//! - Health/metrics HTTP API (`/healthz`, `/metrics`)
//! - Supervised worker loop with restart backoff
//! - Graceful shutdown via broadcast signal

pub mod config;
pub mod core;
pub mod error;
pub mod server;

pub use error::AppError;
