//! Hub registry
//!
//! Explicit process-wide owner of subscription hubs, keyed by hub identifier.
//! Created once at startup and handed to both the dispatcher and anything
//! that joins in-process listeners.

use super::{Listener, SubscriptionHub};
use dashmap::DashMap;
use logcast_core::HubMessage;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Registry of subscription hubs
///
/// Cloning is cheap; all clones share the same hubs.
#[derive(Clone, Default)]
pub struct HubRegistry {
    hubs: Arc<DashMap<String, Arc<SubscriptionHub>>>,
}

impl HubRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the hub with the given identifier, creating it on first use
    pub fn hub(&self, name: &str) -> Arc<SubscriptionHub> {
        if let Some(hub) = self.hubs.get(name) {
            return hub.clone();
        }

        self.hubs
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(hub = %name, "Hub created");
                Arc::new(SubscriptionHub::new(name))
            })
            .value()
            .clone()
    }

    /// Register a listener on a hub, creating the hub if needed
    ///
    /// Runs under the hub's map entry, so a concurrent [`detach`](Self::detach)
    /// of the last listener cannot drop the hub between lookup and registration.
    pub fn attach(
        &self,
        name: &str,
        listener_id: String,
        sender: mpsc::Sender<HubMessage>,
    ) -> (Arc<SubscriptionHub>, Arc<Listener>) {
        let entry = self.hubs.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!(hub = %name, "Hub created");
            Arc::new(SubscriptionHub::new(name))
        });
        let hub = entry.value().clone();
        let listener = hub.register(listener_id, sender);
        (hub, listener)
    }

    /// Unregister a listener and drop its hub once nobody is left on it
    pub fn detach(&self, name: &str, listener_id: &str) -> bool {
        let Some(hub) = self.get(name) else {
            return false;
        };
        let removed = hub.unregister(listener_id);

        if self
            .hubs
            .remove_if(name, |_, hub| hub.listener_count() == 0)
            .is_some()
        {
            tracing::debug!(hub = %name, "Hub removed");
        }

        removed
    }

    /// Get an existing hub without creating it
    pub fn get(&self, name: &str) -> Option<Arc<SubscriptionHub>> {
        self.hubs.get(name).map(|r| r.clone())
    }

    /// Remove a hub, dropping all of its listeners
    pub fn remove(&self, name: &str) -> Option<Arc<SubscriptionHub>> {
        self.hubs.remove(name).map(|(_, hub)| hub)
    }

    /// Identifiers of all hubs
    pub fn hub_names(&self) -> Vec<String> {
        self.hubs.iter().map(|r| r.key().clone()).collect()
    }

    /// Number of hubs
    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    /// Check if no hub exists yet
    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }

    /// Tear down every hub
    pub fn shutdown(&self) {
        let count = self.hubs.len();
        self.hubs.clear();
        tracing::info!(hubs = count, "Hub registry shut down");
    }
}

impl std::fmt::Debug for HubRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubRegistry")
            .field("hubs", &self.hubs.len())
            .finish()
    }
}
