//! Connection state

use serde::{Deserialize, Serialize};

/// State of the connection to a remote hub host
///
/// `Disconnected -> Connecting -> Connected`, then `Disconnected` on close or
/// `Faulted` on a transport error. `Faulted` is left by starting again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Faulted,
}

impl ConnectionState {
    /// Check if a start attempt may be made from this state
    #[must_use]
    pub const fn can_start(self) -> bool {
        matches!(self, Self::Disconnected | Self::Faulted)
    }

    /// Check if remote invocations can be made
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Get the name of this state
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Faulted => "Faulted",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
