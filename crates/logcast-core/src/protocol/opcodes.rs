//! Hub operation codes

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hub operation codes
///
/// Op codes define the type of message being sent or received over the hub connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Server pushes a logged event to a listener (server only)
    Dispatch = 0,
    /// Heartbeat - keep connection alive (client only)
    Heartbeat = 1,
    /// Listen - join a group (client only)
    Listen = 2,
    /// Leave - leave a group (client only)
    Leave = 3,
    /// Invoke - call a hub method (client only)
    Invoke = 4,
    /// Hello - sent on connect (server only)
    Hello = 10,
    /// Heartbeat ACK - heartbeat acknowledged (server only)
    HeartbeatAck = 11,
    /// Listen ACK - group joined (server only)
    ListenAck = 12,
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Listen),
            3 => Some(Self::Leave),
            4 => Some(Self::Invoke),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            12 => Some(Self::ListenAck),
            _ => None,
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this op code can be sent by the client
    #[must_use]
    pub const fn is_client_op(self) -> bool {
        matches!(
            self,
            Self::Heartbeat | Self::Listen | Self::Leave | Self::Invoke
        )
    }

    /// Check if this op code can be sent by the server
    #[must_use]
    pub const fn is_server_op(self) -> bool {
        matches!(
            self,
            Self::Dispatch | Self::Hello | Self::HeartbeatAck | Self::ListenAck
        )
    }

    /// Get the name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Listen => "Listen",
            Self::Leave => "Leave",
            Self::Invoke => "Invoke",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
            Self::ListenAck => "ListenAck",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value).ok_or_else(|| serde::de::Error::custom(format!("invalid op code: {value}")))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_from_u8() {
        assert_eq!(OpCode::from_u8(0), Some(OpCode::Dispatch));
        assert_eq!(OpCode::from_u8(2), Some(OpCode::Listen));
        assert_eq!(OpCode::from_u8(4), Some(OpCode::Invoke));
        assert_eq!(OpCode::from_u8(12), Some(OpCode::ListenAck));
        assert_eq!(OpCode::from_u8(5), None);
        assert_eq!(OpCode::from_u8(255), None);
    }

    #[test]
    fn test_client_and_server_ops_are_disjoint() {
        for raw in 0..=u8::MAX {
            if let Some(op) = OpCode::from_u8(raw) {
                assert_ne!(op.is_client_op(), op.is_server_op(), "{op}");
            }
        }
    }

    #[test]
    fn test_opcode_serialization() {
        let json = serde_json::to_string(&OpCode::Hello).unwrap();
        assert_eq!(json, "10");

        let op: OpCode = serde_json::from_str("2").unwrap();
        assert_eq!(op, OpCode::Listen);

        assert!(serde_json::from_str::<OpCode>("9").is_err());
    }

    #[test]
    fn test_opcode_display() {
        assert_eq!(format!("{}", OpCode::Invoke), "Invoke (4)");
        assert_eq!(format!("{}", OpCode::Dispatch), "Dispatch (0)");
    }
}
