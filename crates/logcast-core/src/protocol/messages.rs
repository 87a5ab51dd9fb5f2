//! Hub message format
//!
//! Defines the structure for all WebSocket messages.

use super::{methods, CloseCode, GroupPayload, HelloPayload, Invocation, ListenPayload, OpCode};
use crate::entities::LoggedEvent;
use crate::value_objects::GroupName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hub message format
///
/// All messages sent over the hub connection follow this format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubMessage {
    /// Operation code
    pub op: OpCode,

    /// Method name (Dispatch and Invoke)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence id (Dispatch only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl HubMessage {
    fn bare(op: OpCode) -> Self {
        Self {
            op,
            t: None,
            s: None,
            d: None,
        }
    }

    // === Server Messages ===

    /// Create a Dispatch message (op=0) pushing one logged event
    #[must_use]
    pub fn dispatch(event: LoggedEvent) -> Self {
        let id = event.id;
        Self {
            op: OpCode::Dispatch,
            t: Some(methods::ON_LOGGED_EVENT.to_string()),
            s: Some(id),
            d: Some(serde_json::to_value(event).unwrap_or_default()),
        }
    }

    /// Create a Hello message (op=10)
    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self {
            d: Some(serde_json::to_value(payload).unwrap_or_default()),
            ..Self::bare(OpCode::Hello)
        }
    }

    /// Create a Heartbeat ACK message (op=11)
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self::bare(OpCode::HeartbeatAck)
    }

    /// Create a Listen ACK message (op=12)
    #[must_use]
    pub fn listen_ack(group: &GroupName) -> Self {
        Self {
            d: Some(serde_json::json!({ "group": group })),
            ..Self::bare(OpCode::ListenAck)
        }
    }

    // === Client Messages ===

    /// Create a Heartbeat message (op=1)
    #[must_use]
    pub fn heartbeat() -> Self {
        Self::bare(OpCode::Heartbeat)
    }

    /// Create a Listen message (op=2); `None` joins the default group
    #[must_use]
    pub fn listen(group: Option<&str>) -> Self {
        let payload = ListenPayload {
            group: group.map(str::to_string),
        };
        Self {
            d: Some(serde_json::to_value(payload).unwrap_or_default()),
            ..Self::bare(OpCode::Listen)
        }
    }

    /// Create a Leave message (op=3)
    #[must_use]
    pub fn leave(group: &GroupName) -> Self {
        Self {
            d: Some(serde_json::json!({ "group": group })),
            ..Self::bare(OpCode::Leave)
        }
    }

    /// Create an Invoke message (op=4)
    #[must_use]
    pub fn invoke(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            op: OpCode::Invoke,
            t: Some(method.into()),
            s: None,
            d: Some(Value::Array(args)),
        }
    }

    // === Parsing ===

    /// Try to parse as a logged event push (op=0)
    pub fn as_logged_event(&self) -> Option<LoggedEvent> {
        if self.op != OpCode::Dispatch {
            return None;
        }
        self.d.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Try to parse as a Hello payload (op=10)
    pub fn as_hello(&self) -> Option<HelloPayload> {
        if self.op != OpCode::Hello {
            return None;
        }
        self.d.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Try to parse as a Listen payload (op=2); a missing payload is a default listen
    pub fn as_listen(&self) -> Option<ListenPayload> {
        if self.op != OpCode::Listen {
            return None;
        }
        match &self.d {
            None | Some(Value::Null) => Some(ListenPayload::default()),
            Some(d) => serde_json::from_value(d.clone()).ok(),
        }
    }

    /// Try to parse as a group payload (op=3 Leave, op=12 ListenAck)
    pub fn as_group(&self) -> Option<GroupPayload> {
        if !matches!(self.op, OpCode::Leave | OpCode::ListenAck) {
            return None;
        }
        self.d.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Try to parse as an invocation (op=4)
    pub fn as_invocation(&self) -> Option<Invocation> {
        if self.op != OpCode::Invoke {
            return None;
        }
        let method = self.t.clone()?;
        let args = match &self.d {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(args)) => args.clone(),
            Some(_) => return None,
        };
        Some(Invocation { method, args })
    }

    // === Utilities ===

    /// Check if this is a valid client message
    #[must_use]
    pub fn is_valid_client_message(&self) -> bool {
        self.op.is_client_op()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Create an error close frame
    #[must_use]
    pub fn close_frame(code: CloseCode) -> (u16, String) {
        (code.as_u16(), code.description().to_string())
    }
}

impl std::fmt::Display for HubMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "HubMessage(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "HubMessage(op={})", self.op)
        }
    }
}
