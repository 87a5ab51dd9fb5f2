//! # logcast-appender
//!
//! Producer side of the broadcaster. Every log event is snapshotted, rendered,
//! given a sequence id and pushed to the subscribers of one group, either
//! through an in-process [`HubRegistry`](logcast_hub::HubRegistry) or through
//! a WebSocket connection to a remote hub host.
//!
//! Dispatch never fails visibly: connection and send errors are turned into
//! diagnostics on the `logcast::diagnostics` target and the event is dropped.
//!
//! ## Example
//!
//! ```ignore
//! use logcast_common::{AppConfig, TracingConfig};
//!
//! let config = AppConfig::from_env()?;
//! let dispatcher = logcast_appender::install_from_config(&config.appender, TracingConfig::default())?;
//!
//! tracing::info!(user = "ada", "signed in");
//! dispatcher.close();
//! ```

pub mod connection;
pub mod dispatch;
pub mod layer;
pub mod layout;
pub mod router;
pub mod setup;
pub mod transport;

pub use connection::{ConnectionManager, ConnectionState};
pub use dispatch::{
    BroadcastConfig, BroadcastDispatcher, BroadcastDispatcherBuilder, DeliveryRoute,
    DispatchError, DispatchObserver, DispatchStats, StatsSnapshot,
};
pub use layer::BroadcastLayer;
pub use layout::{Layout, SimpleLayout};
pub use router::GroupRouter;
pub use setup::{install, install_from_config};
pub use transport::{hub_url, HubConnection, HubProxy, Transport, TransportError, WsTransport};
