//! Payload definitions carried in the `d` field of hub messages

use crate::value_objects::GroupName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Default heartbeat interval (45 seconds)
    pub const DEFAULT_HEARTBEAT_INTERVAL: u64 = 45_000;

    /// Create a new Hello payload with default interval
    #[must_use]
    pub fn new() -> Self {
        Self {
            heartbeat_interval: Self::DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    /// Create a Hello payload with custom interval
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload for op 2 (Listen)
///
/// A missing group joins the default group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl ListenPayload {
    /// Group this listen request resolves to
    #[must_use]
    pub fn group(&self) -> GroupName {
        GroupName::resolve(self.group.as_deref())
    }
}

/// Payload for op 3 (Leave) and op 12 (ListenAck)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPayload {
    pub group: GroupName,
}

/// Parsed op 4 (Invoke) frame
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Hub method name
    pub method: String,
    /// Positional arguments
    pub args: Vec<Value>,
}

impl Invocation {
    /// Get a positional argument
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}
