//! Dispatch observers

use super::DispatchError;
use logcast_core::{EventEnvelope, GroupName};

/// Path an envelope took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryRoute {
    /// In-process hub; carries the number of listeners reached
    Local { listeners: usize },
    /// Handed to the remote hub connection
    Remote,
}

impl DeliveryRoute {
    #[must_use]
    pub const fn is_remote(self) -> bool {
        matches!(self, Self::Remote)
    }
}

/// Notified after every dispatch
///
/// Callbacks run synchronously on the logging thread and must not block.
pub trait DispatchObserver: Send + Sync {
    /// Envelope was delivered along `route`
    fn on_sent(&self, envelope: &EventEnvelope, group: &GroupName, route: DeliveryRoute) {
        let _ = (envelope, group, route);
    }

    /// Envelope was dropped
    fn on_dropped(&self, envelope: &EventEnvelope, error: &DispatchError) {
        let _ = (envelope, error);
    }
}
