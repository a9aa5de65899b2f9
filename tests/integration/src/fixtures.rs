//! Test fixtures and frame builders
//!
//! Provides reusable gateway frames and client configuration for integration tests.

use bot_core::Intents;
use bot_gateway::GatewayConfig;
use serde_json::{json, Value};
use std::time::Duration;

/// Access token issued by the mock token endpoint
pub const TEST_ACCESS_TOKEN: &str = "mock-token";

/// Bearer value derived from [`TEST_ACCESS_TOKEN`]
pub const TEST_AUTHORIZATION: &str = "QQBot mock-token";

pub const TEST_APP_ID: &str = "102000001";
pub const TEST_SECRET: &str = "integration-secret";

/// Session id issued in READY
pub const TEST_SESSION_ID: &str = "session-0001";

/// Intents used by every test client
pub fn test_intents() -> Intents {
    Intents::GUILDS | Intents::PUBLIC_GUILD_MESSAGES | Intents::GROUP_AND_C2C_EVENT
}

/// Gateway settings with short backoff
pub fn test_gateway_config() -> GatewayConfig {
    GatewayConfig::new(test_intents())
        .with_max_retries(3)
        .with_reconnect_delay(Duration::from_millis(50))
        .with_handshake_timeout(Duration::from_secs(5))
}

pub fn hello(heartbeat_interval_ms: u64) -> Value {
    json!({"op": 10, "d": {"heartbeat_interval": heartbeat_interval_ms}})
}

pub fn heartbeat_ack() -> Value {
    json!({"op": 11})
}

pub fn ready(seq: u64) -> Value {
    json!({
        "op": 0,
        "s": seq,
        "t": "READY",
        "d": {
            "version": 1,
            "session_id": TEST_SESSION_ID,
            "user": {"id": "bot-user", "username": "test-bot", "bot": true},
            "shard": [0, 1]
        }
    })
}

pub fn resumed(seq: u64) -> Value {
    json!({"op": 0, "s": seq, "t": "RESUMED", "d": ""})
}

pub fn dispatch(seq: u64, event_type: &str, data: Value) -> Value {
    json!({"op": 0, "s": seq, "t": event_type, "d": data})
}

pub fn group_at_message(seq: u64, message_id: &str, group_openid: &str, content: &str) -> Value {
    dispatch(
        seq,
        "GROUP_AT_MESSAGE_CREATE",
        json!({
            "id": message_id,
            "group_openid": group_openid,
            "content": content,
            "author": {"member_openid": "member-1"}
        }),
    )
}

pub fn reconnect_request() -> Value {
    json!({"op": 7})
}

pub fn invalid_session() -> Value {
    json!({"op": 9, "d": false})
}
