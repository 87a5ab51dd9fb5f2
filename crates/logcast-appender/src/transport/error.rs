//! Transport errors

use crate::connection::ConnectionState;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while connecting to or invoking a remote hub
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("Not connected (state: {0})")]
    NotConnected(ConnectionState),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Failed to encode invocation: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TransportError {
    /// Check if this error only means the connection was not usable
    #[must_use]
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected(_))
    }
}
