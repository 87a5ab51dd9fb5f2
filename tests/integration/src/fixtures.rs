//! Test data

use logcast_appender::BroadcastConfig;
use logcast_core::{GroupName, LoggingEventData};

/// Hub name used by all tests
pub const TEST_HUB: &str = "LogHub";

/// Dispatcher configuration pointing at a running hub host
pub fn remote_config(base_url: &str, group: &str) -> BroadcastConfig {
    BroadcastConfig::remote(base_url)
        .with_hub_name(TEST_HUB)
        .with_group(group_name(group))
}

/// Dispatcher configuration delivering in-process
pub fn local_config(group: &str) -> BroadcastConfig {
    BroadcastConfig::default()
        .with_hub_name(TEST_HUB)
        .with_group(group_name(group))
}

pub fn group_name(name: &str) -> GroupName {
    GroupName::resolve(Some(name))
}

/// A plain INFO event
pub fn info_event(message: &str) -> LoggingEventData {
    LoggingEventData::new("INFO", "integration::app", message)
}
