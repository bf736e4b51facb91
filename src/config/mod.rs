//! Configuration module for supervisor settings and environment loading
//!
//! This module provides:
//! - Configuration types (`AppConfig`, `RestartConfig`, `RunMode`)
//! - Environment loading functionality (`load_config_from_env`)
//! - Logging configuration (`init_logging`)

mod env;
pub mod logging;
mod types;

// Re-export types
pub use types::{AppConfig, RestartConfig, RunMode, DEFAULT_PORT};

// Re-export loader functions
pub use env::{apply_env_aliases, load_config_from_env};

// Re-export logging functions
pub use logging::init_logging;
