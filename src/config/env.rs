//! Environment configuration loader
//!
//! Loads and validates the typed `AppConfig` from environment variables.
//! Every key has a default, so a missing `.env` yields a degraded-but-running
//! process rather than a crash; an *invalid* value is a hard startup error.

use std::str::FromStr;

use crate::error::AppError;

use super::types::{AppConfig, RestartConfig, RunMode, DEFAULT_PORT};

/// Alias mapping for PaaS dashboards that reject underscores in variable
/// names. The alias is copied to the canonical name only when the canonical
/// name is unset.
const ENV_ALIASES: &[(&str, &str)] = &[
    ("RUNMODE", "RUN_MODE"),
    ("WORKERTICKMS", "WORKER_TICK_MS"),
    ("STARTUPGRACESECS", "STARTUP_GRACE_SECS"),
    ("HEARTBEATSTALESECS", "HEARTBEAT_STALE_SECS"),
    ("RESTARTINITIALDELAYMS", "RESTART_INITIAL_DELAY_MS"),
    ("RESTARTMAXDELAYMS", "RESTART_MAX_DELAY_MS"),
    ("RESTARTFAILURETHRESHOLD", "RESTART_FAILURE_THRESHOLD"),
    ("RESTARTSTABLERUNMS", "RESTART_STABLE_RUN_MS"),
    ("LOGFORMAT", "LOG_FORMAT"),
];

/// Copy underscore-stripped aliases to their canonical names.
///
/// Must run after `dotenvy::dotenv()` and before `load_config_from_env()`.
pub fn apply_env_aliases() {
    for (raw_name, canonical_name) in ENV_ALIASES {
        if std::env::var_os(canonical_name).is_none() {
            if let Some(val) = std::env::var_os(raw_name) {
                std::env::set_var(canonical_name, val);
            }
        }
    }
}

/// Parse an environment variable, falling back to `default` when unset.
///
/// A set-but-unparseable value is a configuration error, not a silent
/// fallback — the process must fail fast with a clear message.
fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| {
            AppError::Config(format!("Invalid {}: '{}' ({})", name, raw.trim(), e))
        }),
        Err(_) => Ok(default),
    }
}

/// Load configuration from the environment
///
/// This function:
/// 1. Reads each key (with defaults) into a typed `AppConfig`
/// 2. Validates the configuration rules
///
/// # Returns
/// * `Ok(AppConfig)` - Successfully loaded and validated configuration
/// * `Err(AppError)` - Unparseable value or validation failure
pub fn load_config_from_env() -> Result<AppConfig, AppError> {
    let defaults = RestartConfig::default();

    let config = AppConfig {
        port: parse_var("PORT", DEFAULT_PORT)?,
        run_mode: parse_var("RUN_MODE", RunMode::Server)?,
        worker_tick_ms: parse_var("WORKER_TICK_MS", 1_000)?,
        startup_grace_secs: parse_var("STARTUP_GRACE_SECS", 30)?,
        heartbeat_stale_secs: parse_var("HEARTBEAT_STALE_SECS", 90)?,
        restart: RestartConfig {
            initial_delay_ms: parse_var("RESTART_INITIAL_DELAY_MS", defaults.initial_delay_ms)?,
            max_delay_ms: parse_var("RESTART_MAX_DELAY_MS", defaults.max_delay_ms)?,
            failure_threshold: parse_var(
                "RESTART_FAILURE_THRESHOLD",
                defaults.failure_threshold,
            )?,
            stable_run_ms: parse_var("RESTART_STABLE_RUN_MS", defaults.stable_run_ms)?,
        },
    };

    config.validate()?;

    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ALL_KEYS: &[&str] = &[
        "PORT",
        "RUN_MODE",
        "RUNMODE",
        "WORKER_TICK_MS",
        "WORKERTICKMS",
        "STARTUP_GRACE_SECS",
        "HEARTBEAT_STALE_SECS",
        "RESTART_INITIAL_DELAY_MS",
        "RESTART_MAX_DELAY_MS",
        "RESTART_FAILURE_THRESHOLD",
        "RESTART_STABLE_RUN_MS",
        "RESTARTSTABLERUNMS",
    ];

    fn clear_env() {
        for key in ALL_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_load_defaults_with_empty_env() {
        clear_env();
        let cfg = load_config_from_env().unwrap();
        assert_eq!(cfg.port, 10000);
        assert_eq!(cfg.run_mode, RunMode::Server);
        assert_eq!(cfg.worker_tick_ms, 1_000);
        assert_eq!(cfg.heartbeat_stale_secs, 90);
        assert_eq!(cfg.restart.failure_threshold, 3);
        assert_eq!(cfg.restart.stable_run_ms, 30_000);
    }

    #[test]
    #[serial]
    fn test_load_overrides_from_env() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("RUN_MODE", "worker");
        std::env::set_var("WORKER_TICK_MS", "250");
        std::env::set_var("RESTART_STABLE_RUN_MS", "5000");
        let cfg = load_config_from_env().unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.run_mode, RunMode::Worker);
        assert_eq!(cfg.worker_tick_ms, 250);
        assert_eq!(cfg.restart.stable_run_ms, 5000);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_fails_fast() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        let result = load_config_from_env();
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("Invalid PORT"), "Got: {}", msg);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_run_mode_fails_fast() {
        clear_env();
        std::env::set_var("RUN_MODE", "daemon");
        let result = load_config_from_env();
        assert!(result.is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_validation_runs_after_parsing() {
        clear_env();
        // Parses fine but fails the stale-vs-tick rule
        std::env::set_var("WORKER_TICK_MS", "10000");
        std::env::set_var("HEARTBEAT_STALE_SECS", "5");
        let result = load_config_from_env();
        assert!(result.is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_alias_mapping_fills_canonical_name() {
        clear_env();
        std::env::set_var("RUNMODE", "worker");
        apply_env_aliases();
        let cfg = load_config_from_env().unwrap();
        assert_eq!(cfg.run_mode, RunMode::Worker);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_alias_does_not_override_canonical_name() {
        clear_env();
        std::env::set_var("RUN_MODE", "server");
        std::env::set_var("RUNMODE", "worker");
        apply_env_aliases();
        let cfg = load_config_from_env().unwrap();
        assert_eq!(cfg.run_mode, RunMode::Server);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_dotenv_file_feeds_config() {
        clear_env();
        let mut env_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(env_file, "PORT=9100").unwrap();
        writeln!(env_file, "RUN_MODE=worker").unwrap();
        env_file.flush().unwrap();

        dotenvy::from_path(env_file.path()).unwrap();
        let cfg = load_config_from_env().unwrap();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.run_mode, RunMode::Worker);
        clear_env();
    }
}
