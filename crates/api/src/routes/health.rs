//! Service liveness and status endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub ok: bool,
    pub service: String,
}

/// Body of `GET /status`.
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

/// Root healthcheck naming the service.
///
/// GET /
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        ok: true,
        service: state.config().service_name.clone(),
    })
}

/// GET /status
pub async fn status() -> Json<StatusMessage> {
    Json(StatusMessage {
        message: "API Online",
    })
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the repository answers before returning OK.
/// Returns 503 Service Unavailable if it does not.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.repo().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
