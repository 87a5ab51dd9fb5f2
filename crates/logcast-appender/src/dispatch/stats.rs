//! Dispatch counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated on every dispatch
#[derive(Debug, Default)]
pub struct DispatchStats {
    dispatched: AtomicU64,
    sent_local: AtomicU64,
    sent_remote: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub dispatched: u64,
    pub sent_local: u64,
    pub sent_remote: u64,
    pub dropped: u64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_local(&self) {
        self.sent_local.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_remote(&self) {
        self.sent_remote.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            sent_local: self.sent_local.load(Ordering::Relaxed),
            sent_remote: self.sent_remote.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
