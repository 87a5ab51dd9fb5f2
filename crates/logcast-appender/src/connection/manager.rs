//! Connection manager
//!
//! Owns the single connection to a remote hub host. The connection is created
//! on first use and restarted on a later dispatch after it faults.

use super::ConnectionState;
use crate::transport::{HubConnection, HubProxy, Transport, TransportError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Slot {
    connection: Option<Arc<dyn HubConnection>>,
    last_failure: Option<Instant>,
}

/// Lazily connects to a remote hub host
///
/// Creation and start are serialized by one lock, so concurrent first use
/// opens exactly one connection. Sends happen outside the lock.
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    address: String,
    hub_name: String,
    reconnect_delay: Duration,
    slot: Mutex<Slot>,
}

impl ConnectionManager {
    /// Create a manager; nothing is opened until the first dispatch
    pub fn new(
        transport: Arc<dyn Transport>,
        address: impl Into<String>,
        hub_name: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            address: address.into(),
            hub_name: hub_name.into(),
            reconnect_delay: Duration::ZERO,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Wait at least `delay` after a failed start before trying again
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn hub_name(&self) -> &str {
        &self.hub_name
    }

    /// Make sure a connection exists and has been started
    ///
    /// Returns the resulting state. A start attempt is only made from
    /// `Disconnected` or `Faulted`; while a reconnect delay is in effect the
    /// current state is returned without touching the network.
    pub fn ensure_connected(&self) -> Result<ConnectionState, TransportError> {
        let mut slot = self.slot.lock();

        let connection = match &slot.connection {
            Some(connection) => Arc::clone(connection),
            None => {
                let connection = self.transport.open(&self.address, &self.hub_name);
                slot.connection = Some(Arc::clone(&connection));
                tracing::debug!(
                    address = %self.address,
                    hub = %self.hub_name,
                    "Hub connection created"
                );
                connection
            }
        };

        let state = connection.state();
        if !state.can_start() {
            return Ok(state);
        }

        if let Some(failed_at) = slot.last_failure {
            if failed_at.elapsed() < self.reconnect_delay {
                return Ok(state);
            }
        }

        match connection.start() {
            Ok(()) => {
                slot.last_failure = None;
                tracing::info!(
                    address = %self.address,
                    hub = %self.hub_name,
                    "Connected to remote hub"
                );
                Ok(connection.state())
            }
            Err(e) => {
                slot.last_failure = Some(Instant::now());
                Err(e)
            }
        }
    }

    /// Get a proxy for the hub if the connection is usable right now
    pub fn get_proxy(&self) -> Option<HubProxy> {
        let slot = self.slot.lock();
        let connection = slot.connection.as_ref()?;
        connection
            .state()
            .is_connected()
            .then(|| HubProxy::new(Arc::clone(connection), self.hub_name.clone()))
    }

    /// Current connection state; `Disconnected` before first use
    pub fn state(&self) -> ConnectionState {
        self.slot
            .lock()
            .connection
            .as_ref()
            .map_or(ConnectionState::Disconnected, |c| c.state())
    }

    /// Check if a connection has been created
    pub fn is_open(&self) -> bool {
        self.slot.lock().connection.is_some()
    }

    /// Stop and release the connection; safe to call repeatedly
    pub fn close(&self) {
        let connection = {
            let mut slot = self.slot.lock();
            slot.last_failure = None;
            slot.connection.take()
        };

        if let Some(connection) = connection {
            connection.stop();
            tracing::info!(hub = %self.hub_name, "Remote hub connection closed");
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("address", &self.address)
            .field("hub_name", &self.hub_name)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use std::thread;

    fn manager(transport: &MockTransport) -> ConnectionManager {
        ConnectionManager::new(Arc::new(transport.clone()), "ws://hub", "LogHub")
    }

    #[test]
    fn test_lazy_creation() {
        let transport = MockTransport::new();
        let manager = manager(&transport);

        assert!(!manager.is_open());
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert!(manager.get_proxy().is_none());
        assert_eq!(transport.record.opens(), 0);

        let state = manager.ensure_connected().unwrap();
        assert_eq!(state, ConnectionState::Connected);
        assert_eq!(transport.record.opens(), 1);
        assert!(manager.get_proxy().is_some());
    }

    #[test]
    fn test_connected_is_not_restarted() {
        let transport = MockTransport::new();
        let manager = manager(&transport);

        manager.ensure_connected().unwrap();
        manager.ensure_connected().unwrap();
        manager.ensure_connected().unwrap();

        assert_eq!(transport.record.opens(), 1);
        assert_eq!(transport.record.starts(), 1);
    }

    #[test]
    fn test_concurrent_first_use_opens_once() {
        let transport = MockTransport::new();
        let manager = Arc::new(manager(&transport));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.ensure_connected().unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), ConnectionState::Connected);
        }
        assert_eq!(transport.record.opens(), 1);
        assert_eq!(transport.record.starts(), 1);
    }

    #[test]
    fn test_failed_start_faults_and_retries() {
        let transport = MockTransport::failing();
        let manager = manager(&transport);

        assert!(manager.ensure_connected().is_err());
        assert_eq!(manager.state(), ConnectionState::Faulted);
        assert!(manager.get_proxy().is_none());

        // No delay configured: the next dispatch tries again
        assert!(manager.ensure_connected().is_err());
        assert_eq!(transport.record.opens(), 1);
        assert_eq!(transport.record.starts(), 2);
    }

    #[test]
    fn test_reconnect_delay_suppresses_attempts() {
        let transport = MockTransport::failing();
        let manager = manager(&transport).with_reconnect_delay(Duration::from_secs(60));

        assert!(manager.ensure_connected().is_err());
        let state = manager.ensure_connected().unwrap();
        assert_eq!(state, ConnectionState::Faulted);
        assert_eq!(transport.record.starts(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let transport = MockTransport::new();
        let manager = manager(&transport);

        manager.close();
        assert_eq!(transport.record.stops(), 0);

        manager.ensure_connected().unwrap();
        manager.close();
        manager.close();

        assert_eq!(transport.record.stops(), 1);
        assert!(!manager.is_open());
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_reopens_after_close() {
        let transport = MockTransport::new();
        let manager = manager(&transport);

        manager.ensure_connected().unwrap();
        manager.close();
        manager.ensure_connected().unwrap();

        assert_eq!(transport.record.opens(), 2);
    }
}
