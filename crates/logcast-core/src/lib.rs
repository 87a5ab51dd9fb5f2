//! # logcast-core
//!
//! Core types shared by the appender and the hub: log envelopes, group names,
//! and the JSON protocol spoken over the hub WebSocket.
//! This crate has no dependencies on a runtime or transport.

pub mod entities;
pub mod error;
pub mod protocol;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{EventEnvelope, LoggedEvent, LoggingEventData};
pub use error::CoreError;
pub use protocol::{
    methods, CloseCode, GroupPayload, HelloPayload, HubMessage, Invocation, ListenPayload, OpCode,
};
pub use value_objects::{GroupName, DEFAULT_GROUP, DEFAULT_HUB};
