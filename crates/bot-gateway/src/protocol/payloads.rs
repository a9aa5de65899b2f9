//! Control frame payloads
//!
//! Payload structures carried in the `d` field of non-dispatch frames.

use bot_core::Intents;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to authenticate a fresh session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Authorization value, `QQBot <access_token>`
    pub token: String,
    /// Event categories to receive
    pub intents: Intents,
    /// `[shard_index, shard_count]`
    pub shard: [u32; 2],
    /// Client properties, sent as `{}` unless configured
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl IdentifyPayload {
    /// Single-shard identify with empty properties
    #[must_use]
    pub fn new(token: impl Into<String>, intents: Intents) -> Self {
        Self {
            token: token.into(),
            intents,
            shard: [0, 1],
            properties: Map::new(),
        }
    }

    #[must_use]
    pub fn with_shard(mut self, index: u32, count: u32) -> Self {
        self.shard = [index, count];
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }
}

impl From<&IdentifyPayload> for Value {
    fn from(payload: &IdentifyPayload) -> Self {
        let mut d = Map::new();
        d.insert("token".to_string(), Value::from(payload.token.as_str()));
        d.insert("intents".to_string(), Value::from(payload.intents.bits()));
        d.insert("shard".to_string(), Value::from(payload.shard.to_vec()));
        d.insert("properties".to_string(), Value::Object(payload.properties.clone()));
        Value::Object(d)
    }
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to continue a dropped session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Authorization value, `QQBot <access_token>`
    pub token: String,
    /// Session id from the READY dispatch
    pub session_id: String,
    /// Last sequence number received
    pub seq: u64,
}

impl From<&ResumePayload> for Value {
    fn from(payload: &ResumePayload) -> Self {
        let mut d = Map::new();
        d.insert("token".to_string(), Value::from(payload.token.as_str()));
        d.insert("session_id".to_string(), Value::from(payload.session_id.as_str()));
        d.insert("seq".to_string(), Value::from(payload.seq));
        Value::Object(d)
    }
}

/// Bot user included in the READY dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyUser {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

/// Payload of the READY dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyPayload {
    #[serde(default)]
    pub version: u32,
    pub session_id: String,
    pub user: ReadyUser,
    #[serde(default)]
    pub shard: Vec<u32>,
}
