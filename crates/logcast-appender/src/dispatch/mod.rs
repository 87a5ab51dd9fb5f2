//! Event dispatch
//!
//! The dispatcher turns each log call into an [`EventEnvelope`] and delivers
//! it along exactly one path.
//!
//! [`EventEnvelope`]: logcast_core::EventEnvelope

mod config;
mod dispatcher;
mod error;
mod observer;
mod stats;

pub use config::BroadcastConfig;
pub use dispatcher::{BroadcastDispatcher, BroadcastDispatcherBuilder};
pub use error::DispatchError;
pub use observer::{DeliveryRoute, DispatchObserver};
pub use stats::{DispatchStats, StatsSnapshot};
