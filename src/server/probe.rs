//! Self health probe for the container HEALTHCHECK
//!
//! `sniper_bot healthcheck` probes the process's own `/healthz` endpoint and
//! exits 0/1, replacing `curl -f` so the runtime image ships no extra tools.
//! The timing constants mirror the Dockerfile HEALTHCHECK wiring.

use std::time::Duration;

use crate::error::{AppError, Result};

/// Orchestrator probe contract, mirrored by the Dockerfile HEALTHCHECK
pub const PROBE_INTERVAL_SECS: u64 = 30;
/// Per-probe timeout
pub const PROBE_TIMEOUT_SECS: u64 = 5;
/// Consecutive failures before the container is marked unhealthy
pub const PROBE_RETRIES: u32 = 3;
/// Grace period after start before failures count
pub const PROBE_START_PERIOD_SECS: u64 = 30;

/// Probe the local health endpoint once.
///
/// Succeeds iff `/healthz` answers with a 2xx status within the probe
/// timeout. Connection errors, timeouts, and non-2xx statuses are failures.
pub async fn run_probe(port: u16) -> Result<()> {
    let url = format!("http://127.0.0.1:{}/healthz", port);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
        .build()
        .map_err(|e| AppError::Probe(e.to_string()))?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| AppError::Probe(format!("{}: {}", url, e)))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(AppError::Probe(format!(
            "{} returned {}",
            url,
            response.status()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pin the probe contract values wired into the Dockerfile HEALTHCHECK
    #[test]
    fn test_probe_contract_constants() {
        assert_eq!(PROBE_INTERVAL_SECS, 30);
        assert_eq!(PROBE_TIMEOUT_SECS, 5);
        assert_eq!(PROBE_RETRIES, 3);
        assert_eq!(PROBE_START_PERIOD_SECS, 30);
    }

    #[tokio::test]
    async fn test_probe_fails_when_nothing_listens() {
        // Bind then drop to get a port that is very likely closed
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = run_probe(port).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Health probe failed"));
    }
}
