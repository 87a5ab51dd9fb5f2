//! Transport abstraction for reaching a remote hub host
//!
//! A [`Transport`] opens [`HubConnection`]s; the connection manager owns at
//! most one of them and the router invokes hub methods through a
//! [`HubProxy`].

mod error;
mod proxy;
mod ws;

#[cfg(test)]
pub(crate) mod mock;

pub use error::TransportError;
pub use proxy::HubProxy;
pub use ws::{hub_url, WsConnection, WsTransport, DEFAULT_SEND_BUFFER};

use crate::connection::ConnectionState;
use serde_json::Value;
use std::sync::Arc;

/// Opens connections to remote hub hosts
pub trait Transport: Send + Sync {
    /// Create a connection bound to `address` and `hub_name`
    ///
    /// The connection starts out `Disconnected`; nothing touches the network
    /// until [`HubConnection::start`] is called.
    fn open(&self, address: &str, hub_name: &str) -> Arc<dyn HubConnection>;
}

/// One client session with a remote hub host
///
/// All methods are synchronous and safe to call from any thread, including
/// threads that are already driving an async runtime.
pub trait HubConnection: Send + Sync {
    /// Current state
    fn state(&self) -> ConnectionState;

    /// Connect and complete the handshake, blocking until done
    ///
    /// On failure the connection is left `Faulted`.
    fn start(&self) -> Result<(), TransportError>;

    /// Invoke a hub method with positional arguments
    fn invoke(&self, method: &str, args: Vec<Value>) -> Result<(), TransportError>;

    /// Close the session; further invocations fail until started again
    fn stop(&self);
}
