//! Dispatch errors
//!
//! None of these ever reach the caller of `dispatch`; they are reported as
//! diagnostics and to observers.

use crate::connection::ConnectionState;
use crate::transport::TransportError;
use thiserror::Error;

/// Reason an event was dropped
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to connect to remote hub: {0}")]
    Connection(#[source] TransportError),

    #[error("Remote hub unavailable (state: {0})")]
    RemoteUnavailable(ConnectionState),

    #[error("Failed to send to remote hub: {0}")]
    Send(#[source] TransportError),
}

impl DispatchError {
    /// Classify an error from a remote send
    pub fn from_send(error: TransportError) -> Self {
        match error {
            TransportError::NotConnected(state) => Self::RemoteUnavailable(state),
            other => Self::Send(other),
        }
    }

    /// Short code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "CONNECTION_FAILED",
            Self::RemoteUnavailable(_) => "REMOTE_UNAVAILABLE",
            Self::Send(_) => "SEND_FAILED",
        }
    }
}
