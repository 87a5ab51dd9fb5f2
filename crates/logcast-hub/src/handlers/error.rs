//! Handler error types

use logcast_core::{CloseCode, CoreError};
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Invalid payload received
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Method not exposed by the hub
    #[error("Unknown hub method: {0}")]
    UnknownMethod(String),

    /// Arguments do not match the invoked method
    #[error("Invalid arguments for {method}: {reason}")]
    InvalidArguments { method: String, reason: String },

    /// Invalid group name
    #[error("Invalid group: {0}")]
    InvalidGroup(#[from] CoreError),

    /// Listener vanished while handling its frame
    #[error("Listener not registered: {0}")]
    UnknownListener(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert to a close code (if applicable)
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::InvalidPayload(_) => Some(CloseCode::DecodeError),
            Self::UnknownMethod(_) => Some(CloseCode::UnknownMethod),
            Self::InvalidArguments { .. } => Some(CloseCode::InvalidArguments),
            Self::InvalidGroup(_) => Some(CloseCode::InvalidGroup),
            Self::UnknownListener(_) => Some(CloseCode::SessionTimeout),
            Self::Internal(_) => Some(CloseCode::UnknownError),
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
