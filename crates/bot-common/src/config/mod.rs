//! Configuration structs

mod app_config;

pub use app_config::{
    ApiSettings, AppConfig, AppSettings, BotConfig, ConfigError, Environment, GatewaySettings,
};
