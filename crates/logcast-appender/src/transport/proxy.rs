//! Hub proxy

use super::{HubConnection, TransportError};
use crate::connection::ConnectionState;
use serde_json::Value;
use std::sync::Arc;

/// Handle for invoking methods on one hub over an established connection
#[derive(Clone)]
pub struct HubProxy {
    connection: Arc<dyn HubConnection>,
    hub_name: String,
}

impl HubProxy {
    pub fn new(connection: Arc<dyn HubConnection>, hub_name: impl Into<String>) -> Self {
        Self {
            connection,
            hub_name: hub_name.into(),
        }
    }

    pub fn hub_name(&self) -> &str {
        &self.hub_name
    }

    /// State of the underlying connection
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Invoke a hub method
    pub fn invoke(&self, method: &str, args: Vec<Value>) -> Result<(), TransportError> {
        self.connection.invoke(method, args)
    }
}

impl std::fmt::Debug for HubProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubProxy")
            .field("hub_name", &self.hub_name)
            .field("state", &self.state())
            .finish()
    }
}
