//! Hub host server setup
//!
//! Provides the WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::hub_handler;
pub use state::HubState;

use crate::hub::HubRegistry;
use axum::{routing::get, Router};
use logcast_common::{AppConfig, AppError, HubConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the hub host router
pub fn create_router() -> Router<HubState> {
    Router::new()
        .route("/hubs/:hub", get(hub_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: HubState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create `HubState` around a registry
///
/// Passing the registry in lets the same process fan out in-process and
/// serve remote listeners from one set of hubs.
pub fn create_hub_state(config: HubConfig, registry: HubRegistry) -> HubState {
    HubState::new(registry, config)
}

/// Run the hub host server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting hub host on {}", addr);

    let listener = TcpListener::bind(addr).await.map_err(|source| AppError::Bind {
        addr: addr.to_string(),
        source,
    })?;

    tracing::info!("Hub host listening on ws://{}/hubs/{{hub}}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    Ok(())
}

/// Run the complete hub host with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .hub
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid hub address {}: {e}", config.hub.address())))?;

    let registry = HubRegistry::new();
    let state = create_hub_state(config.hub, registry.clone());
    let app = create_app(state);

    let result = run_server(app, addr).await;
    registry.shutdown();
    result
}
