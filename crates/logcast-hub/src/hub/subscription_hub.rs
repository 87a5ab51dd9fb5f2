//! Subscription hub
//!
//! Tracks listeners and group membership using DashMap for thread-safe access,
//! and fans logged events out to every member of a group.

use super::Listener;
use logcast_core::{EventEnvelope, GroupName, HubMessage, LoggedEvent};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A named hub that listeners join and dispatchers fan out through
///
/// Membership lives only as long as the listener is registered.
pub struct SubscriptionHub {
    /// Hub identifier
    name: String,

    /// Registered listeners by listener ID
    listeners: DashMap<String, Arc<Listener>>,

    /// Group name to listener IDs mapping
    groups: DashMap<GroupName, HashSet<String>>,
}

impl SubscriptionHub {
    /// Create a new hub
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    /// Hub identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a listener's outgoing channel
    ///
    /// Re-registering an ID replaces the previous listener and drops its memberships.
    pub fn register(&self, listener_id: String, sender: mpsc::Sender<HubMessage>) -> Arc<Listener> {
        self.unregister(&listener_id);

        let listener = Listener::new(listener_id.clone(), sender);
        self.listeners.insert(listener_id.clone(), listener.clone());

        tracing::debug!(hub = %self.name, listener_id = %listener_id, "Listener registered");

        listener
    }

    /// Remove a listener and all of its group memberships
    ///
    /// Uses `alter` for atomic modify-and-cleanup operations to avoid TOCTOU race conditions.
    pub fn unregister(&self, listener_id: &str) -> bool {
        let Some((_, listener)) = self.listeners.remove(listener_id) else {
            return false;
        };

        for group in listener.groups() {
            self.groups.alter(&group, |_, mut members| {
                members.remove(listener_id);
                members
            });
        }

        // Clean up all empty group entries atomically
        self.groups.retain(|_, members| !members.is_empty());

        tracing::debug!(hub = %self.name, listener_id = %listener_id, "Listener unregistered");

        true
    }

    /// Get a listener by ID
    pub fn listener(&self, listener_id: &str) -> Option<Arc<Listener>> {
        self.listeners.get(listener_id).map(|r| r.clone())
    }

    /// Add a listener to a group
    ///
    /// Idempotent. Returns false if the listener is not registered.
    pub fn join(&self, listener_id: &str, group: &GroupName) -> bool {
        let Some(listener) = self.listener(listener_id) else {
            return false;
        };

        listener.add_group(group.clone());
        self.groups
            .entry(group.clone())
            .or_default()
            .insert(listener_id.to_string());

        // Unregistered in the meantime: its cleanup may have missed this entry
        let still_registered = self
            .listeners
            .get(listener_id)
            .is_some_and(|current| Arc::ptr_eq(current.value(), &listener));
        if !still_registered {
            self.groups.alter(group, |_, mut members| {
                members.remove(listener_id);
                members
            });
            self.groups.remove_if(group, |_, members| members.is_empty());
            return false;
        }

        tracing::trace!(
            hub = %self.name,
            listener_id = %listener_id,
            group = %group,
            "Listener joined group"
        );

        true
    }

    /// Remove a listener from a group
    ///
    /// Returns false if the listener is not registered.
    pub fn leave(&self, listener_id: &str, group: &GroupName) -> bool {
        let Some(listener) = self.listener(listener_id) else {
            return false;
        };

        listener.remove_group(group);

        // Atomically modify the members set
        self.groups.alter(group, |_, mut members| {
            members.remove(listener_id);
            members
        });

        // Clean up empty entry
        self.groups.remove_if(group, |_, members| members.is_empty());

        tracing::trace!(
            hub = %self.name,
            listener_id = %listener_id,
            group = %group,
            "Listener left group"
        );

        true
    }

    /// Get all listeners currently in a group
    pub fn members(&self, group: &GroupName) -> Vec<Arc<Listener>> {
        self.groups
            .get(group)
            .map(|members| {
                members
                    .iter()
                    .filter_map(|id| self.listeners.get(id).map(|l| l.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Push a logged event to every current member of a group
    ///
    /// Returns the number of listeners that accepted the push. A group with no
    /// members is a silent no-op.
    pub fn on_fanout(&self, event: &LoggedEvent, group: &GroupName) -> usize {
        let members = self.members(group);
        if members.is_empty() {
            tracing::trace!(hub = %self.name, group = %group, id = event.id, "No listeners in group");
            return 0;
        }

        let message = HubMessage::dispatch(event.clone());
        let mut sent = 0;

        for listener in members {
            match listener.push(message.clone()) {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::debug!(
                        hub = %self.name,
                        listener_id = %listener.listener_id(),
                        error = %e,
                        "Dropped push to listener"
                    );
                }
            }
        }

        tracing::trace!(
            hub = %self.name,
            group = %group,
            id = event.id,
            sent = sent,
            "Logged event fanned out"
        );

        sent
    }

    /// Fan out an envelope to a group, or to the default group
    pub fn on_message_logged(&self, envelope: &EventEnvelope, group: Option<&GroupName>) -> usize {
        let default_group = GroupName::default();
        self.on_fanout(&envelope.to_logged_event(), group.unwrap_or(&default_group))
    }

    /// Get the number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Get the number of groups with at least one member
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Get the number of members in a group
    pub fn member_count(&self, group: &GroupName) -> usize {
        self.groups.get(group).map_or(0, |members| members.len())
    }

    /// Check if a listener is registered
    pub fn has_listener(&self, listener_id: &str) -> bool {
        self.listeners.contains_key(listener_id)
    }
}

impl std::fmt::Debug for SubscriptionHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHub")
            .field("name", &self.name)
            .field("listeners", &self.listeners.len())
            .field("groups", &self.groups.len())
            .finish()
    }
}
