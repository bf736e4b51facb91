//! Configuration types for the process supervisor
//!
//! All environment reads happen once at startup and land in these structs,
//! which are passed explicitly to whatever needs them. Nothing else in the
//! codebase touches `std::env` after boot.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default HTTP port for the health/metrics API
pub const DEFAULT_PORT: u16 = 10000;

// ============================================================================
// Enums
// ============================================================================

/// Process run mode, selected at invocation time.
///
/// `Server` serves the health/metrics API only; `Worker` additionally runs
/// the supervised worker loop. The `--worker` CLI flag forces `Worker` and
/// overrides the `RUN_MODE` environment variable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Server,
    Worker,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Server => write!(f, "server"),
            RunMode::Worker => write!(f, "worker"),
        }
    }
}

impl std::str::FromStr for RunMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(RunMode::Server),
            "worker" => Ok(RunMode::Worker),
            other => Err(AppError::Config(format!(
                "RUN_MODE must be 'server' or 'worker' (got '{}')",
                other
            ))),
        }
    }
}

impl RunMode {
    /// Resolve the effective run mode from argv and the configured default.
    ///
    /// The `--worker` flag forces worker mode and overrides `RUN_MODE`;
    /// without it the configured mode applies.
    pub fn resolve(args: &[String], configured: RunMode) -> RunMode {
        if args.iter().any(|a| a == "--worker") {
            RunMode::Worker
        } else {
            configured
        }
    }
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Worker restart policy for the supervisor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartConfig {
    /// Initial backoff delay in milliseconds (doubles each consecutive failure)
    pub initial_delay_ms: u64,
    /// Maximum backoff delay cap in milliseconds
    pub max_delay_ms: u64,
    /// Consecutive failures before the process reports unhealthy
    pub failure_threshold: u32,
    /// Run time in milliseconds after which a worker run counts as
    /// recovered and the consecutive failure count resets
    pub stable_run_ms: u64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            failure_threshold: 3,
            stable_run_ms: 30_000,
        }
    }
}

/// Root application configuration, loaded once from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP port for the health/metrics API (`PORT`, default 10000)
    pub port: u16,
    /// Default run mode (`RUN_MODE`, overridden by the `--worker` flag)
    pub run_mode: RunMode,
    /// Worker heartbeat tick interval in milliseconds (`WORKER_TICK_MS`)
    pub worker_tick_ms: u64,
    /// Startup grace before the orchestrator counts probe failures
    /// (`STARTUP_GRACE_SECS`); informational, wired into the HEALTHCHECK
    pub startup_grace_secs: u64,
    /// Worker heartbeat age after which the process reports unhealthy
    /// (`HEARTBEAT_STALE_SECS`)
    pub heartbeat_stale_secs: u64,
    /// Worker restart policy
    pub restart: RestartConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            run_mode: RunMode::Server,
            worker_tick_ms: 1_000,
            startup_grace_secs: 30,
            heartbeat_stale_secs: 90,
            restart: RestartConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        if self.port == 0 {
            return Err(AppError::Config("PORT must not be 0".to_string()));
        }

        if self.worker_tick_ms == 0 {
            return Err(AppError::Config(
                "WORKER_TICK_MS must be greater than 0".to_string(),
            ));
        }

        if self.startup_grace_secs == 0 {
            return Err(AppError::Config(
                "STARTUP_GRACE_SECS must be greater than 0".to_string(),
            ));
        }

        if self.heartbeat_stale_secs == 0 {
            return Err(AppError::Config(
                "HEARTBEAT_STALE_SECS must be greater than 0".to_string(),
            ));
        }

        // Rule: staleness window must exceed the tick interval, otherwise a
        // healthy worker can never keep its heartbeat fresh
        if self.heartbeat_stale_secs * 1_000 <= self.worker_tick_ms {
            return Err(AppError::Config(format!(
                "HEARTBEAT_STALE_SECS ({}) must exceed WORKER_TICK_MS ({}ms)",
                self.heartbeat_stale_secs, self.worker_tick_ms
            )));
        }

        if self.restart.initial_delay_ms == 0 {
            return Err(AppError::Config(
                "RESTART_INITIAL_DELAY_MS must be greater than 0".to_string(),
            ));
        }

        if self.restart.max_delay_ms < self.restart.initial_delay_ms {
            return Err(AppError::Config(format!(
                "RESTART_MAX_DELAY_MS ({}) must be >= RESTART_INITIAL_DELAY_MS ({})",
                self.restart.max_delay_ms, self.restart.initial_delay_ms
            )));
        }

        if self.restart.failure_threshold == 0 {
            return Err(AppError::Config(
                "RESTART_FAILURE_THRESHOLD must be greater than 0".to_string(),
            ));
        }

        if self.restart.stable_run_ms == 0 {
            return Err(AppError::Config(
                "RESTART_STABLE_RUN_MS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
