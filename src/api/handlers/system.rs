//! System endpoints: health check and connection introspection.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::ConnectionsResponse;
use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    connected_devices: usize,
    total_connections: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, version, and connection statistics.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            connected_devices: state.registry.device_count().await,
            total_connections: state.registry.connection_count().await,
        }),
    )
}

/// `GET /connections` — Current WebSocket connection statistics.
#[utoipa::path(
    get,
    path = "/connections",
    tag = "Monitoring",
    summary = "Connection statistics",
    description = "Reports the number of online devices and open channels.",
    responses(
        (status = 200, description = "Connection counts", body = ConnectionsResponse),
    )
)]
pub async fn connections_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ConnectionsResponse {
            connected_devices: state.registry.device_count().await,
            total_connections: state.registry.connection_count().await,
            timestamp: Utc::now(),
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/connections", get(connections_handler))
}
