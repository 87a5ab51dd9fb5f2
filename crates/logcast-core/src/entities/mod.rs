//! Entities - the records that travel from a log call to its listeners

mod envelope;
mod event_data;

pub use envelope::{EventEnvelope, LoggedEvent};
pub use event_data::LoggingEventData;
