//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use bot_core::Intents;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub bot: BotConfig,
    pub gateway: GatewaySettings,
    pub api: ApiSettings,
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

/// Bot identity and subscription
#[derive(Clone, Deserialize)]
pub struct BotConfig {
    pub app_id: String,
    pub secret: String,
    pub intents: Intents,
    #[serde(default)]
    pub sandbox: bool,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("app_id", &self.app_id)
            .field("secret", &"<redacted>")
            .field("intents", &self.intents.names())
            .field("sandbox", &self.sandbox)
            .finish()
    }
}

/// Gateway session tuning
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Heartbeat ack grace window; one heartbeat interval when unset
    #[serde(default)]
    pub heartbeat_grace_ms: Option<u64>,
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
}

impl GatewaySettings {
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    #[must_use]
    pub fn heartbeat_grace(&self) -> Option<Duration> {
        self.heartbeat_grace_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            heartbeat_grace_ms: None,
            handshake_timeout_ms: default_handshake_timeout_ms(),
        }
    }
}

/// REST client settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_timeout_ms")]
    pub timeout_ms: u64,
}

impl ApiSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// Default value functions
fn default_app_name() -> String {
    "qq-bot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_retries() -> u32 {
    3
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_handshake_timeout_ms() -> u64 {
    30_000
}

fn default_api_timeout_ms() -> u64 {
    10_000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };

        let intents_raw = required("BOT_INTENTS")?;
        let intents = Intents::parse_names(intents_raw.split(','))
            .map_err(|e| ConfigError::InvalidValue("BOT_INTENTS", e.to_string()))?;
        if intents.is_empty() {
            return Err(ConfigError::InvalidValue(
                "BOT_INTENTS",
                "at least one intent is required".to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            bot: BotConfig {
                app_id: required("BOT_APP_ID")?,
                secret: required("BOT_SECRET")?,
                intents,
                sandbox: parse_optional(&lookup, "BOT_SANDBOX")?.unwrap_or(false),
            },
            gateway: GatewaySettings {
                max_retries: parse_optional(&lookup, "GATEWAY_MAX_RETRIES")?
                    .unwrap_or_else(default_max_retries),
                reconnect_delay_ms: parse_optional(&lookup, "GATEWAY_RECONNECT_DELAY_MS")?
                    .unwrap_or_else(default_reconnect_delay_ms),
                heartbeat_grace_ms: parse_optional(&lookup, "GATEWAY_HEARTBEAT_GRACE_MS")?,
                handshake_timeout_ms: parse_optional(&lookup, "GATEWAY_HANDSHAKE_TIMEOUT_MS")?
                    .unwrap_or_else(default_handshake_timeout_ms),
            },
            api: ApiSettings {
                timeout_ms: parse_optional(&lookup, "API_TIMEOUT_MS")?
                    .unwrap_or_else(default_api_timeout_ms),
            },
        })
    }
}

/// Parse an optional variable, rejecting values that are present but malformed
fn parse_optional<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
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
