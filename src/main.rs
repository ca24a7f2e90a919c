//! fleet-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use fleet_gateway::api;
use fleet_gateway::app_state::AppState;
use fleet_gateway::config::GatewayConfig;
use fleet_gateway::domain::{ConnectionRegistry, Dispatcher};
use fleet_gateway::ledger::ActionLedgerClient;
use fleet_gateway::service::CommandService;
use fleet_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting fleet-gateway");

    // Build domain layer
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));

    // Build service layer
    let ledger = Arc::new(ActionLedgerClient::new(
        config.ledger_base_url.clone(),
        config.ledger_timeout_secs,
    )?);
    let command_service = Arc::new(CommandService::new(Arc::clone(&dispatcher), ledger));

    // Build application state
    let app_state = AppState {
        registry,
        dispatcher,
        command_service,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
