//! Dispatcher configuration

use logcast_common::AppenderConfig;
use logcast_core::{GroupName, DEFAULT_HUB};
use std::time::Duration;

/// Settings read once when the dispatcher is built
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    /// Base URL of a remote hub host; `None` delivers in-process
    pub remote_address: Option<String>,
    pub hub_name: String,
    pub group: GroupName,
    /// With a remote configured, never fall back to the in-process hub
    pub prefer_remote: bool,
    pub connect_timeout: Duration,
    /// Minimum wait after a failed connect before the next attempt
    pub reconnect_delay: Duration,
}

impl BroadcastConfig {
    /// Deliver to a remote hub host at `address`
    #[must_use]
    pub fn remote(address: impl Into<String>) -> Self {
        Self {
            remote_address: Some(address.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_hub_name(mut self, hub_name: impl Into<String>) -> Self {
        self.hub_name = hub_name.into();
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: GroupName) -> Self {
        self.group = group;
        self
    }

    #[must_use]
    pub fn with_prefer_remote(mut self, prefer_remote: bool) -> Self {
        self.prefer_remote = prefer_remote;
        self
    }

    /// Remote address, if one is configured and non-blank
    pub fn remote_address(&self) -> Option<&str> {
        self.remote_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            remote_address: None,
            hub_name: DEFAULT_HUB.to_string(),
            group: GroupName::default(),
            prefer_remote: true,
            connect_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::ZERO,
        }
    }
}

impl From<&AppenderConfig> for BroadcastConfig {
    fn from(config: &AppenderConfig) -> Self {
        Self {
            remote_address: config.remote_address.clone(),
            hub_name: config.hub_name.clone(),
            group: config.group.clone(),
            prefer_remote: config.prefer_remote,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
        }
    }
}
