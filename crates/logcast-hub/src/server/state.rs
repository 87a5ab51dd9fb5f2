//! Hub host state
//!
//! Application state for the hub host server.

use crate::hub::HubRegistry;
use logcast_common::HubConfig;
use std::sync::Arc;
use std::time::Duration;

/// Hub host application state
///
/// Holds all shared dependencies for the hub host.
#[derive(Clone)]
pub struct HubState {
    /// Registry of hubs reachable through this host
    registry: HubRegistry,
    /// Host configuration
    config: Arc<HubConfig>,
}

impl HubState {
    /// Create a new hub state
    pub fn new(registry: HubRegistry, config: HubConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }

    /// Get the hub registry
    pub fn registry(&self) -> &HubRegistry {
        &self.registry
    }

    /// Get the host configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Heartbeat interval announced to clients
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.config.heartbeat_interval_ms)
    }

    /// Silence after which a client is considered dead
    pub fn heartbeat_timeout(&self) -> Duration {
        self.heartbeat_interval() * 2
    }
}

impl std::fmt::Debug for HubState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubState")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
