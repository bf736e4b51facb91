//! HTTP API serving the health and metrics endpoints.
//!
//! Uses `axum` for routing with CORS support. Readiness flips only after the
//! TCP listener is bound, so an orchestrator polling `/healthz` during the
//! start period sees "not yet healthy" rather than connection errors turning
//! into crashes.

pub mod probe;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::core::health::{HealthSnapshot, HealthState, HealthStatus};
use crate::core::metrics::{Metrics, MetricsSnapshot};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub health: Arc<HealthState>,
    pub metrics: Arc<Metrics>,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `0.0.0.0:port`, mark the process ready, and serve until shutdown.
pub async fn start_server(
    state: AppState,
    port: u16,
    shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    info!(address = %addr, "Health API listening");

    // Readiness contract: ready means the listener is accepting probes
    state.health.mark_ready();

    serve(listener, state, shutdown_rx).await
}

/// Serve the API on an already-bound listener.
///
/// Split from `start_server` so tests can bind an ephemeral port first.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;
    Ok(())
}

/// GET /healthz — 200 with a snapshot when healthy, 503 otherwise
async fn healthz_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthSnapshot>) {
    state.metrics.inc_probe();
    let snapshot = state.health.snapshot();
    let code = match snapshot.status {
        HealthStatus::Ok => StatusCode::OK,
        HealthStatus::Starting | HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(snapshot))
}

/// GET /metrics — snapshot of all process counters
async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
