//! Broadcast dispatcher
//!
//! Snapshot, render, number and deliver. Every call takes exactly one path:
//! the in-process hub when no remote is configured, otherwise the remote hub
//! (falling back to in-process only when `prefer_remote` is off).

use super::{
    BroadcastConfig, DeliveryRoute, DispatchError, DispatchObserver, DispatchStats, StatsSnapshot,
};
use crate::connection::{ConnectionManager, ConnectionState};
use crate::layout::{Layout, SimpleLayout};
use crate::router::GroupRouter;
use crate::transport::{Transport, WsTransport};
use logcast_common::DIAGNOSTIC_TARGET;
use logcast_core::{EventEnvelope, GroupName, LoggingEventData};
use logcast_hub::HubRegistry;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Pushes log events to the subscribers of one group
pub struct BroadcastDispatcher {
    config: BroadcastConfig,
    layout: Box<dyn Layout>,
    router: GroupRouter,
    /// Present only when a remote address is configured
    connection: Option<ConnectionManager>,
    sequence: AtomicU64,
    observers: RwLock<Vec<Arc<dyn DispatchObserver>>>,
    stats: DispatchStats,
}

impl BroadcastDispatcher {
    /// Create a dispatcher with a private registry and the WebSocket transport
    pub fn new(config: BroadcastConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: BroadcastConfig) -> BroadcastDispatcherBuilder {
        BroadcastDispatcherBuilder::new(config)
    }

    pub fn config(&self) -> &BroadcastConfig {
        &self.config
    }

    /// Registry the in-process path delivers into
    pub fn registry(&self) -> &HubRegistry {
        self.router.registry()
    }

    pub fn group(&self) -> &GroupName {
        self.router.group()
    }

    /// Check if events go to a remote hub host
    pub fn is_remote(&self) -> bool {
        self.connection.is_some()
    }

    /// State of the remote connection; `Disconnected` when delivering locally
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
            .as_ref()
            .map_or(ConnectionState::Disconnected, ConnectionManager::state)
    }

    /// Last sequence id handed out
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Add an observer notified after every dispatch
    pub fn register_observer(&self, observer: Arc<dyn DispatchObserver>) {
        self.observers.write().push(observer);
    }

    /// Dispatch a log event
    ///
    /// Never fails; problems are reported on the diagnostics target.
    pub fn dispatch(&self, event: LoggingEventData) {
        let formatted = self.layout.format(&event);
        let data = match event.to_value() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(
                    target: DIAGNOSTIC_TARGET,
                    error = %e,
                    "Failed to serialize event data, sending text only"
                );
                Value::Null
            }
        };
        self.dispatch_formatted(formatted, data);
    }

    /// Dispatch an already rendered event with its structured payload
    pub fn dispatch_formatted(&self, formatted: impl Into<String>, data: Value) {
        let id = self.next_sequence();
        let envelope = EventEnvelope::new(id, formatted, data);
        self.stats.record_dispatched();

        match self.deliver(&envelope) {
            Ok(route) => {
                match route {
                    DeliveryRoute::Local { .. } => self.stats.record_local(),
                    DeliveryRoute::Remote => self.stats.record_remote(),
                }
                tracing::trace!(id, ?route, "Event dispatched");
                for observer in self.observers() {
                    observer.on_sent(&envelope, self.router.group(), route);
                }
            }
            Err(e) => {
                self.stats.record_dropped();
                tracing::warn!(
                    target: DIAGNOSTIC_TARGET,
                    id,
                    hub = %self.router.hub_name(),
                    group = %self.router.group(),
                    code = e.code(),
                    error = %e,
                    "Dropped log event"
                );
                for observer in self.observers() {
                    observer.on_dropped(&envelope, &e);
                }
            }
        }
    }

    /// Stop the remote connection, if any; safe to call repeatedly
    ///
    /// A later dispatch reconnects lazily.
    pub fn close(&self) {
        if let Some(connection) = &self.connection {
            connection.close();
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn observers(&self) -> Vec<Arc<dyn DispatchObserver>> {
        self.observers.read().clone()
    }

    fn deliver(&self, envelope: &EventEnvelope) -> Result<DeliveryRoute, DispatchError> {
        let Some(connection) = &self.connection else {
            return Ok(self.deliver_local(envelope));
        };

        let state = match connection.ensure_connected() {
            Ok(state) => state,
            Err(e) if self.config.prefer_remote => return Err(DispatchError::Connection(e)),
            Err(e) => {
                tracing::warn!(
                    target: DIAGNOSTIC_TARGET,
                    address = %connection.address(),
                    error = %e,
                    "Remote hub unreachable, delivering in-process"
                );
                return Ok(self.deliver_local(envelope));
            }
        };

        let proxy = if state.is_connected() {
            connection.get_proxy()
        } else {
            None
        };

        match proxy {
            Some(proxy) => {
                self.router
                    .send_remote(&proxy, envelope)
                    .map_err(DispatchError::from_send)?;
                Ok(DeliveryRoute::Remote)
            }
            None if self.config.prefer_remote => {
                Err(DispatchError::RemoteUnavailable(connection.state()))
            }
            None => Ok(self.deliver_local(envelope)),
        }
    }

    fn deliver_local(&self, envelope: &EventEnvelope) -> DeliveryRoute {
        let listeners = self.router.send_local(envelope);
        DeliveryRoute::Local { listeners }
    }
}

impl std::fmt::Debug for BroadcastDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastDispatcher")
            .field("config", &self.config)
            .field("sequence", &self.current_sequence())
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

/// Builder for [`BroadcastDispatcher`]
pub struct BroadcastDispatcherBuilder {
    config: BroadcastConfig,
    registry: Option<HubRegistry>,
    transport: Option<Arc<dyn Transport>>,
    layout: Option<Box<dyn Layout>>,
    observers: Vec<Arc<dyn DispatchObserver>>,
}

impl BroadcastDispatcherBuilder {
    pub fn new(config: BroadcastConfig) -> Self {
        Self {
            config,
            registry: None,
            transport: None,
            layout: None,
            observers: Vec::new(),
        }
    }

    /// Deliver in-process events into a shared registry
    #[must_use]
    pub fn registry(mut self, registry: HubRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Reach remote hubs through a custom transport
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Some(Box::new(layout));
        self
    }

    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn DispatchObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> BroadcastDispatcher {
        let config = self.config;
        let registry = self.registry.unwrap_or_default();
        let router = GroupRouter::new(registry, config.hub_name.clone(), config.group.clone());

        let connection = config.remote_address().map(|address| {
            let transport = self
                .transport
                .unwrap_or_else(|| Arc::new(WsTransport::new(config.connect_timeout)));
            ConnectionManager::new(transport, address, config.hub_name.clone())
                .with_reconnect_delay(config.reconnect_delay)
        });

        BroadcastDispatcher {
            layout: self.layout.unwrap_or_else(|| Box::new(SimpleLayout::new())),
            router,
            connection,
            sequence: AtomicU64::new(0),
            observers: RwLock::new(self.observers),
            stats: DispatchStats::new(),
            config,
        }
    }
}
