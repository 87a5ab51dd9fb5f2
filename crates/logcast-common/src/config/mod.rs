//! Configuration structs

mod app_config;

pub use app_config::{AppConfig, AppSettings, AppenderConfig, ConfigError, Environment, HubConfig};
