//! Hub listener
//!
//! A single subscriber attached to a hub: an outgoing message channel plus the
//! groups it has joined.

use logcast_core::{GroupName, HubMessage};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// A listener attached to a subscription hub
pub struct Listener {
    /// Unique listener ID (connection ID for socket listeners)
    listener_id: String,

    /// Channel to push messages to the listener
    sender: mpsc::Sender<HubMessage>,

    /// Groups this listener has joined
    groups: RwLock<HashSet<GroupName>>,

    /// Last heartbeat received
    last_heartbeat: RwLock<Instant>,

    /// Number of logged events pushed to this listener
    delivered: AtomicU64,
}

impl Listener {
    /// Create a new listener
    pub fn new(listener_id: String, sender: mpsc::Sender<HubMessage>) -> Arc<Self> {
        Arc::new(Self {
            listener_id,
            sender,
            groups: RwLock::new(HashSet::new()),
            last_heartbeat: RwLock::new(Instant::now()),
            delivered: AtomicU64::new(0),
        })
    }

    /// Get the listener ID
    pub fn listener_id(&self) -> &str {
        &self.listener_id
    }

    /// Record a joined group; returns false if already a member
    pub(crate) fn add_group(&self, group: GroupName) -> bool {
        self.groups.write().insert(group)
    }

    /// Forget a group; returns false if not a member
    pub(crate) fn remove_group(&self, group: &GroupName) -> bool {
        self.groups.write().remove(group)
    }

    /// Get all joined groups
    pub fn groups(&self) -> Vec<GroupName> {
        self.groups.read().iter().cloned().collect()
    }

    /// Check if the listener joined a group
    pub fn is_member_of(&self, group: &GroupName) -> bool {
        self.groups.read().contains(group)
    }

    /// Record a heartbeat received
    pub fn record_heartbeat(&self) {
        *self.last_heartbeat.write() = Instant::now();
    }

    /// Get time since last heartbeat
    pub fn time_since_heartbeat(&self) -> Duration {
        self.last_heartbeat.read().elapsed()
    }

    /// Number of logged events pushed so far
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Push a logged event without waiting
    ///
    /// A full or closed channel drops the push; delivery is best effort.
    pub fn push(&self, message: HubMessage) -> Result<(), mpsc::error::TrySendError<HubMessage>> {
        self.sender.try_send(message)?;
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Send a control message (acks), waiting for channel capacity
    pub async fn send(&self, message: HubMessage) -> Result<(), mpsc::error::SendError<HubMessage>> {
        self.sender.send(message).await
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("listener_id", &self.listener_id)
            .field("groups", &self.groups.read().len())
            .field("delivered", &self.delivered.load(Ordering::Relaxed))
            .finish()
    }
}
