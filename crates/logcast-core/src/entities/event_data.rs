//! Logging event data - structured snapshot of a single log call

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Owned snapshot of a log call
///
/// Everything the producer may reuse after the call returns is copied in
/// here, including the timestamp and the calling thread's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingEventData {
    pub level: String,
    pub logger_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub fields: Map<String, Value>,
}

impl LoggingEventData {
    /// Create a snapshot stamped with the current time and thread
    pub fn new(
        level: impl Into<String>,
        logger_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level: level.into(),
            logger_name: logger_name.into(),
            message: message.into(),
            timestamp: Utc::now(),
            thread_name: std::thread::current().name().map(str::to_string),
            module_path: None,
            file: None,
            line: None,
            fields: Map::new(),
        }
    }

    /// Attach source location
    #[must_use]
    pub fn with_location(
        mut self,
        module_path: Option<&str>,
        file: Option<&str>,
        line: Option<u32>,
    ) -> Self {
        self.module_path = module_path.map(str::to_string);
        self.file = file.map(str::to_string);
        self.line = line;
        self
    }

    /// Add a structured field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Override the timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Serialize to a JSON value
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
