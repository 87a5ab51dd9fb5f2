//! Process-wide installation
//!
//! Installs the global `tracing` subscriber with console output and a
//! [`BroadcastLayer`], so every event the application logs is broadcast.

use crate::dispatch::{BroadcastConfig, BroadcastDispatcher};
use crate::layer::BroadcastLayer;
use logcast_common::{try_init_tracing_with_layer, AppenderConfig, TracingConfig, TracingError};
use std::sync::Arc;

/// Install a global subscriber that broadcasts through `dispatcher`
///
/// Returns the dispatcher so the caller can register observers or close it.
pub fn install(
    dispatcher: Arc<BroadcastDispatcher>,
    tracing: TracingConfig,
) -> Result<Arc<BroadcastDispatcher>, TracingError> {
    try_init_tracing_with_layer(tracing, BroadcastLayer::new(Arc::clone(&dispatcher)))?;
    Ok(dispatcher)
}

/// Build a dispatcher from configuration and install it globally
pub fn install_from_config(
    config: &AppenderConfig,
    tracing: TracingConfig,
) -> Result<Arc<BroadcastDispatcher>, TracingError> {
    let dispatcher = Arc::new(BroadcastDispatcher::new(BroadcastConfig::from(config)));
    install(dispatcher, tracing)
}
