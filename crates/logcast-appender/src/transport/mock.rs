//! In-memory transport for tests

use super::{HubConnection, Transport, TransportError};
use crate::connection::ConnectionState;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Recorded hub invocation
#[derive(Debug, Clone)]
pub(crate) struct RecordedInvocation {
    pub method: String,
    pub args: Vec<Value>,
}

/// Shared view of everything the mock saw
#[derive(Debug, Default)]
pub(crate) struct MockRecord {
    pub opens: AtomicUsize,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub fail_start: AtomicBool,
    pub invocations: Mutex<Vec<RecordedInvocation>>,
}

impl MockRecord {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.lock().clone()
    }
}

/// Transport whose connections never touch the network
#[derive(Debug, Default, Clone)]
pub(crate) struct MockTransport {
    pub record: Arc<MockRecord>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every start attempt fail
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.record.fail_start.store(true, Ordering::SeqCst);
        transport
    }
}

impl Transport for MockTransport {
    fn open(&self, _address: &str, _hub_name: &str) -> Arc<dyn HubConnection> {
        self.record.opens.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockConnection {
            record: Arc::clone(&self.record),
            state: Mutex::new(ConnectionState::Disconnected),
        })
    }
}

#[derive(Debug)]
pub(crate) struct MockConnection {
    record: Arc<MockRecord>,
    state: Mutex<ConnectionState>,
}

impl HubConnection for MockConnection {
    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    fn start(&self) -> Result<(), TransportError> {
        self.record.starts.fetch_add(1, Ordering::SeqCst);
        // Give concurrent callers a chance to race the first start
        std::thread::sleep(std::time::Duration::from_millis(5));
        if self.record.fail_start.load(Ordering::SeqCst) {
            *self.state.lock() = ConnectionState::Faulted;
            return Err(TransportError::Connect("connection refused".to_string()));
        }
        *self.state.lock() = ConnectionState::Connected;
        Ok(())
    }

    fn invoke(&self, method: &str, args: Vec<Value>) -> Result<(), TransportError> {
        let state = self.state();
        if !state.is_connected() {
            return Err(TransportError::NotConnected(state));
        }
        self.record.invocations.lock().push(RecordedInvocation {
            method: method.to_string(),
            args,
        });
        Ok(())
    }

    fn stop(&self) {
        self.record.stops.fetch_add(1, Ordering::SeqCst);
        *self.state.lock() = ConnectionState::Disconnected;
    }
}
