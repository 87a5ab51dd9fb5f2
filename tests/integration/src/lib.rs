//! Integration test utilities for the log broadcaster
//!
//! Spawns a hub host on an ephemeral port and connects WebSocket listeners
//! to it, so dispatchers can be exercised end to end.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
