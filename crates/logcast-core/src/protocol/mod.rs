//! Hub protocol definitions
//!
//! Defines the WebSocket protocol spoken between listeners, remote
//! dispatchers and the hub host: op codes, message frames and close codes.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use messages::HubMessage;
pub use opcodes::OpCode;
pub use payloads::{GroupPayload, HelloPayload, Invocation, ListenPayload};

/// Hub method names
pub mod methods {
    /// Server-side method a remote dispatcher invokes to fan out an envelope
    pub const ON_MESSAGE_LOGGED: &str = "OnMessageLogged";

    /// Join a group (same as op 2)
    pub const LISTEN: &str = "Listen";

    /// Leave a group (same as op 3)
    pub const LEAVE: &str = "Leave";

    /// Client-side method name carried by every push
    pub const ON_LOGGED_EVENT: &str = "onLoggedEvent";
}
