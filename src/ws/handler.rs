//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// The upgrade is accepted unconditionally; the connection only becomes
/// addressable after the identification handshake succeeds.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let registry = std::sync::Arc::clone(&state.registry);
    ws.on_upgrade(move |socket| run_connection(socket, registry))
}
