//! WebSocket close codes
//!
//! Defines hub-specific close codes for WebSocket connections.

use serde::{Deserialize, Serialize};

/// Hub WebSocket close codes
///
/// These codes are sent when closing a WebSocket connection to indicate the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Unknown error occurred
    UnknownError = 4000,
    /// Invalid opcode sent
    UnknownOpcode = 4001,
    /// Invalid payload encoding (JSON decode error)
    DecodeError = 4002,
    /// Invoked a method the hub does not expose
    UnknownMethod = 4003,
    /// Invocation arguments did not match the method
    InvalidArguments = 4004,
    /// Invalid group name
    InvalidGroup = 4005,
    /// Session has timed out
    SessionTimeout = 4009,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownOpcode),
            4002 => Some(Self::DecodeError),
            4003 => Some(Self::UnknownMethod),
            4004 => Some(Self::InvalidArguments),
            4005 => Some(Self::InvalidGroup),
            4009 => Some(Self::SessionTimeout),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Human readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error",
            Self::UnknownOpcode => "Unknown opcode",
            Self::DecodeError => "Decode error",
            Self::UnknownMethod => "Unknown hub method",
            Self::InvalidArguments => "Invalid invocation arguments",
            Self::InvalidGroup => "Invalid group name",
            Self::SessionTimeout => "Session timed out",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}
