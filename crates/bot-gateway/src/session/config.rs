//! Gateway session configuration

use super::ReconnectPolicy;
use bot_common::GatewaySettings;
use bot_core::Intents;
use serde_json::{Map, Value};
use std::time::Duration;

/// Settings fixed for the lifetime of a session
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Intent mask sent in Identify
    pub intents: Intents,
    /// `[index, total]`
    pub shard: [u32; 2],
    /// Identify `properties`
    pub properties: Map<String, Value>,
    /// Consecutive reconnect attempts before giving up
    pub max_retries: u32,
    /// Linear backoff step
    pub reconnect_delay: Duration,
    /// Ack window after a heartbeat; `None` means one heartbeat interval
    pub heartbeat_grace: Option<Duration>,
    /// Time allowed between transport open and the first dispatch
    pub handshake_timeout: Duration,
}

impl GatewayConfig {
    /// Default handshake window
    pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

    #[must_use]
    pub fn new(intents: Intents) -> Self {
        Self {
            intents,
            shard: [0, 1],
            properties: Map::new(),
            max_retries: ReconnectPolicy::DEFAULT_MAX_RETRIES,
            reconnect_delay: ReconnectPolicy::DEFAULT_BASE_DELAY,
            heartbeat_grace: None,
            handshake_timeout: Self::DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Build from the environment-driven settings
    #[must_use]
    pub fn from_settings(intents: Intents, settings: &GatewaySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            reconnect_delay: settings.reconnect_delay(),
            heartbeat_grace: settings.heartbeat_grace(),
            handshake_timeout: settings.handshake_timeout(),
            ..Self::new(intents)
        }
    }

    #[must_use]
    pub fn with_shard(mut self, index: u32, total: u32) -> Self {
        self.shard = [index, total];
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    #[must_use]
    pub fn with_heartbeat_grace(mut self, grace: Duration) -> Self {
        self.heartbeat_grace = Some(grace);
        self
    }

    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Reconnect policy derived from these settings
    #[must_use]
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(self.max_retries, self.reconnect_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::new(Intents::GUILDS);
        assert_eq!(config.shard, [0, 1]);
        assert!(config.properties.is_empty());
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert_eq!(config.heartbeat_grace, None);
        assert_eq!(config.handshake_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_from_settings() {
        let settings = GatewaySettings {
            max_retries: 5,
            reconnect_delay_ms: 100,
            heartbeat_grace_ms: Some(250),
            handshake_timeout_ms: 1000,
        };
        let config = GatewayConfig::from_settings(Intents::GUILDS | Intents::INTERACTION, &settings);

        assert_eq!(config.intents, Intents::GUILDS | Intents::INTERACTION);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.reconnect_delay, Duration::from_millis(100));
        assert_eq!(config.heartbeat_grace, Some(Duration::from_millis(250)));
        assert_eq!(config.handshake_timeout, Duration::from_secs(1));
        assert_eq!(config.reconnect_policy().backoff(2), Duration::from_millis(200));
    }
}
