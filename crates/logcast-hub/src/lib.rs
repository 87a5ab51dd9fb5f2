//! # logcast-hub
//!
//! Listener-facing side of the broadcaster: subscription hubs that fan logged
//! events out to group members, the registry that owns them, and a WebSocket
//! host so remote listeners and remote dispatchers can reach a hub.

pub mod handlers;
pub mod hub;
pub mod server;

pub use hub::{HubRegistry, Listener, SubscriptionHub};
pub use server::{create_app, create_hub_state, create_router, run, run_server, HubState};
