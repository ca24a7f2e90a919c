//! REST endpoint handlers organized by concern.

pub mod commands;
pub mod messaging;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all REST routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(commands::routes())
        .merge(messaging::routes())
        .merge(system::routes())
}
