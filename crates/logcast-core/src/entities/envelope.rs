//! Event envelope - one logged event plus its sequence id

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable record of one logged event
///
/// Built once per dispatch. The id is assigned by the dispatcher from a
/// process-wide atomic counter and is never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    id: u64,
    formatted_event: String,
    logging_event: Value,
}

impl EventEnvelope {
    /// Create a new envelope
    pub fn new(id: u64, formatted_event: impl Into<String>, logging_event: Value) -> Self {
        Self {
            id,
            formatted_event: formatted_event.into(),
            logging_event,
        }
    }

    /// Sequence id
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Event rendered through the configured layout
    #[inline]
    pub fn formatted_event(&self) -> &str {
        &self.formatted_event
    }

    /// Structured event payload
    #[inline]
    pub fn logging_event(&self) -> &Value {
        &self.logging_event
    }

    /// Build the push delivered to listeners
    #[must_use]
    pub fn to_logged_event(&self) -> LoggedEvent {
        LoggedEvent {
            formatted_event: self.formatted_event.clone(),
            logging_event: self.logging_event.clone(),
            id: self.id,
        }
    }

    /// Serialize to a JSON value for remote invocation
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Push delivered to every member of a group
///
/// Serialized as the 3-tuple `[formattedText, eventData, sequenceId]`; this is
/// the listener-facing contract and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "(String, Value, u64)", from = "(String, Value, u64)")]
pub struct LoggedEvent {
    pub formatted_event: String,
    pub logging_event: Value,
    pub id: u64,
}

impl From<LoggedEvent> for (String, Value, u64) {
    fn from(event: LoggedEvent) -> Self {
        (event.formatted_event, event.logging_event, event.id)
    }
}

impl From<(String, Value, u64)> for LoggedEvent {
    fn from((formatted_event, logging_event, id): (String, Value, u64)) -> Self {
        Self {
            formatted_event,
            logging_event,
            id,
        }
    }
}
