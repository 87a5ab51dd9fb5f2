//! Application configuration structs
//!
//! Loads configuration from environment variables and an optional `.env` file.

use logcast_core::{GroupName, HelloPayload, DEFAULT_HUB};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub hub: HubConfig,
    pub appender: AppenderConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Hub host configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_hub_port")]
    pub port: u16,
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,
}

impl HubConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_hub_port(),
            heartbeat_interval_ms: default_heartbeat_interval(),
        }
    }
}

/// Broadcast appender configuration
///
/// Read once when the dispatcher is built.
#[derive(Debug, Clone, Deserialize)]
pub struct AppenderConfig {
    /// Base URL of a remote hub host; `None` delivers in-process
    #[serde(default)]
    pub remote_address: Option<String>,
    #[serde(default = "default_hub_name")]
    pub hub_name: String,
    #[serde(default)]
    pub group: GroupName,
    /// Use only the remote path when a remote address is configured
    #[serde(default = "default_prefer_remote")]
    pub prefer_remote: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub reconnect_delay_ms: u64,
}

impl AppenderConfig {
    /// Check if a remote target is configured
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote_address.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self {
            remote_address: None,
            hub_name: default_hub_name(),
            group: GroupName::default(),
            prefer_remote: default_prefer_remote(),
            connect_timeout_ms: default_connect_timeout(),
            reconnect_delay_ms: 0,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "logcast".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_hub_port() -> u16 {
    8088
}

fn default_heartbeat_interval() -> u64 {
    HelloPayload::DEFAULT_HEARTBEAT_INTERVAL
}

fn default_hub_name() -> String {
    DEFAULT_HUB.to_string()
}

fn default_prefer_remote() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    5000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            app: AppSettings {
                name: var("APP_NAME").unwrap_or_else(default_app_name),
                env: var("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            hub: HubConfig {
                host: var("HUB_HOST").unwrap_or_else(default_host),
                port: parse_var(&var, "HUB_PORT")?.unwrap_or_else(default_hub_port),
                heartbeat_interval_ms: parse_var(&var, "HUB_HEARTBEAT_INTERVAL_MS")?
                    .unwrap_or_else(default_heartbeat_interval),
            },
            appender: AppenderConfig {
                remote_address: var("LOGCAST_REMOTE_ADDRESS").map(|s| s.trim().to_string()),
                hub_name: var("LOGCAST_HUB_NAME").unwrap_or_else(default_hub_name),
                group: match var("LOGCAST_GROUP") {
                    Some(s) => GroupName::new(&s)
                        .map_err(|e| ConfigError::InvalidValue("LOGCAST_GROUP", e.to_string()))?,
                    None => GroupName::default(),
                },
                prefer_remote: match var("LOGCAST_PREFER_REMOTE") {
                    Some(s) => parse_bool(&s)
                        .ok_or(ConfigError::InvalidValue("LOGCAST_PREFER_REMOTE", s))?,
                    None => default_prefer_remote(),
                },
                connect_timeout_ms: parse_var(&var, "LOGCAST_CONNECT_TIMEOUT_MS")?
                    .unwrap_or_else(default_connect_timeout),
                reconnect_delay_ms: parse_var(&var, "LOGCAST_RECONNECT_DELAY_MS")?.unwrap_or(0),
            },
        })
    }
}

fn parse_var<T, F>(var: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
