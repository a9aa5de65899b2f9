//! # bot-common
//!
//! Shared utilities including configuration, error handling, credentials, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    AccessToken, AppAccessTokenProvider, CredentialError, CredentialProvider, StaticCredential,
    ACCESS_TOKEN_URL, AUTHORIZATION_SCHEME,
};
pub use config::{
    ApiSettings, AppConfig, AppSettings, BotConfig, ConfigError, Environment, GatewaySettings,
};
pub use error::{AppError, AppResult};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
