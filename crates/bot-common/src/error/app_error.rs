//! Application error types
//!
//! Top-level error for the bot process. Library crates keep their own error enums and are
//! folded into this one at the binary boundary.

use crate::auth::CredentialError;
use crate::config::ConfigError;
use crate::telemetry::TracingError;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Startup errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    // Authentication errors
    #[error(transparent)]
    Credential(#[from] CredentialError),

    // External service errors
    #[error("REST API error: {0}")]
    Api(String),

    // Gateway errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// The session stopped and will not reconnect
    #[error("Gateway session closed: {0}")]
    SessionClosed(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get the process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            // Misconfiguration, see sysexits EX_CONFIG
            Self::Config(_) | Self::Tracing(_) => 78,
            Self::Credential(_)
            | Self::Api(_)
            | Self::Gateway(_)
            | Self::SessionClosed(_)
            | Self::Internal(_) => 1,
        }
    }

    /// Create a REST API error
    #[must_use]
    pub fn api(err: impl fmt::Display) -> Self {
        Self::Api(err.to_string())
    }

    /// Create a gateway error
    #[must_use]
    pub fn gateway(err: impl fmt::Display) -> Self {
        Self::Gateway(err.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::Config(ConfigError::MissingVar("BOT_APP_ID")).exit_code(), 78);
        assert_eq!(AppError::api("boom").exit_code(), 1);
        assert_eq!(AppError::SessionClosed("reconnect exhausted".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_helper_methods() {
        let err = AppError::api("code 11241: token invalid");
        assert_eq!(err.to_string(), "REST API error: code 11241: token invalid");

        let err = AppError::gateway("no url");
        assert_eq!(err.to_string(), "Gateway error: no url");
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: AppError = ConfigError::MissingVar("BOT_SECRET").into();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: BOT_SECRET"
        );
    }
}
