//! Readiness endpoint.
//!
//! Liveness (`GET /health`) comes from the web crate and never touches the
//! sidecar; readiness does.

use super::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,
    /// Sidecar health check outcome
    pub sidecar: bool,
}

/// Readiness check endpoint.
///
/// Probes the sidecar's health endpoint. Returns 200 when it answers
/// successfully and 503 otherwise.
///
/// ```bash
/// curl http://localhost:3000/ready
/// # {"ready":true,"sidecar":true}
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let sidecar = match state.sidecar.health().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Sidecar is not ready");
            false
        }
    };

    let status = if sidecar {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready: sidecar,
            sidecar,
        }),
    )
}
