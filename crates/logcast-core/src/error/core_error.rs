//! Core errors - validation failures for core value types

use thiserror::Error;

/// Errors raised while constructing core values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Group name must not be empty")]
    EmptyGroupName,

    #[error("Group name too long: max {max} characters")]
    GroupNameTooLong { max: usize },

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),
}

impl CoreError {
    /// Get error code for protocol responses and diagnostics
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyGroupName => "EMPTY_GROUP_NAME",
            Self::GroupNameTooLong { .. } => "GROUP_NAME_TOO_LONG",
            Self::InvalidEnvelope(_) => "INVALID_ENVELOPE",
        }
    }
}
