//! Subscription hubs
//!
//! Listener bookkeeping and group fan-out.

mod listener;
mod registry;
mod subscription_hub;

pub use listener::Listener;
pub use registry::HubRegistry;
pub use subscription_hub::SubscriptionHub;
