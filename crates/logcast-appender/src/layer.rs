//! `tracing` layer that feeds every event into a [`BroadcastDispatcher`]
//!
//! The layer copies each event into an owned [`LoggingEventData`] before
//! dispatching, so nothing borrowed from the call site outlives the call.
//! Events from the broadcaster's own stack are skipped, and a per-thread
//! guard stops any event emitted while dispatching from looping back.

use crate::dispatch::BroadcastDispatcher;
use logcast_core::LoggingEventData;
use serde_json::{Map, Value};
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Targets whose events are never broadcast
const IGNORED_TARGETS: &[&str] = &[
    "logcast",
    "logcast_appender",
    "logcast_hub",
    "logcast_common",
    "logcast_core",
    "tokio_tungstenite",
    "tungstenite",
    "tokio",
    "mio",
    "hyper",
    "axum",
    "tower_http",
];

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

/// Clears the re-entrancy flag on drop
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Option<Self> {
        DISPATCHING.with(|flag| {
            if flag.get() {
                None
            } else {
                flag.set(true);
                Some(Self)
            }
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|flag| flag.set(false));
    }
}

/// Broadcasts `tracing` events
pub struct BroadcastLayer {
    dispatcher: Arc<BroadcastDispatcher>,
    ignored_targets: Vec<String>,
}

impl BroadcastLayer {
    pub fn new(dispatcher: Arc<BroadcastDispatcher>) -> Self {
        Self {
            dispatcher,
            ignored_targets: IGNORED_TARGETS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Also skip events whose target is `prefix` or a module below it
    #[must_use]
    pub fn ignore_target(mut self, prefix: impl Into<String>) -> Self {
        self.ignored_targets.push(prefix.into());
        self
    }

    pub fn dispatcher(&self) -> &Arc<BroadcastDispatcher> {
        &self.dispatcher
    }

    /// Close the dispatcher's remote connection
    pub fn close(&self) {
        self.dispatcher.close();
    }

    fn is_ignored(&self, target: &str) -> bool {
        self.ignored_targets.iter().any(|prefix| {
            target
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
        })
    }
}

impl<S: Subscriber> Layer<S> for BroadcastLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if self.is_ignored(metadata.target()) {
            return;
        }

        let Some(_guard) = DispatchGuard::enter() else {
            return;
        };

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut data = LoggingEventData::new(
            metadata.level().to_string(),
            metadata.target(),
            visitor.message.unwrap_or_default(),
        )
        .with_location(metadata.module_path(), metadata.file(), metadata.line());
        data.fields = visitor.fields;

        self.dispatcher.dispatch(data);
    }
}

impl Drop for BroadcastLayer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Collects the message and structured fields of one event
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}
