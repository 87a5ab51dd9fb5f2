//! Layouts render an event snapshot into the text pushed to listeners

use logcast_core::LoggingEventData;
use serde_json::Value;
use std::fmt::Write;

/// Renders an event into its formatted text
pub trait Layout: Send + Sync {
    fn format(&self, event: &LoggingEventData) -> String;
}

impl<F> Layout for F
where
    F: Fn(&LoggingEventData) -> String + Send + Sync,
{
    fn format(&self, event: &LoggingEventData) -> String {
        self(event)
    }
}

/// `<timestamp> <LEVEL> <logger> - <message> [key=value ...]`
#[derive(Debug, Clone)]
pub struct SimpleLayout {
    timestamp_format: String,
    include_fields: bool,
}

impl SimpleLayout {
    pub fn new() -> Self {
        Self {
            timestamp_format: "%Y-%m-%dT%H:%M:%S%.3fZ".to_string(),
            include_fields: true,
        }
    }

    /// Use a `chrono` strftime pattern for the timestamp
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Append structured fields after the message
    #[must_use]
    pub fn with_fields(mut self, include: bool) -> Self {
        self.include_fields = include;
        self
    }
}

impl Default for SimpleLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout for SimpleLayout {
    fn format(&self, event: &LoggingEventData) -> String {
        let mut out = format!(
            "{} {} {} - {}",
            event.timestamp.format(&self.timestamp_format),
            event.level,
            event.logger_name,
            event.message
        );

        if self.include_fields {
            for (key, value) in &event.fields {
                match value {
                    Value::String(s) => {
                        let _ = write!(out, " {key}={s}");
                    }
                    other => {
                        let _ = write!(out, " {key}={other}");
                    }
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event() -> LoggingEventData {
        LoggingEventData::new("INFO", "app::db", "connected")
            .with_timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
            .with_field("attempt", 2)
            .with_field("table", "users")
    }

    #[test]
    fn test_simple_layout() {
        let text = SimpleLayout::new().format(&event());
        assert_eq!(
            text,
            "2024-05-01T12:30:00.000Z INFO app::db - connected attempt=2 table=users"
        );
    }

    #[test]
    fn test_simple_layout_without_fields() {
        let text = SimpleLayout::new()
            .with_fields(false)
            .with_timestamp_format("%H:%M")
            .format(&event());
        assert_eq!(text, "12:30 INFO app::db - connected");
    }

    #[test]
    fn test_closure_layout() {
        let layout = |e: &LoggingEventData| format!("[{}] {}", e.level, e.message);
        assert_eq!(layout.format(&event()), "[INFO] connected");
    }
}
