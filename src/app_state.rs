//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, Dispatcher};
use crate::service::CommandService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The single per-process connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Frame router over the registry.
    pub dispatcher: Arc<Dispatcher>,
    /// Command orchestration (dispatch + action ledger).
    pub command_service: Arc<CommandService>,
}
