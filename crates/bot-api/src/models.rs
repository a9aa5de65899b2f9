//! Request and response bodies

use bot_core::Correlation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /gateway` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayInfo {
    pub url: String,
}

/// Session creation limits attached to `GET /gateway/bot`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionStartLimit {
    pub total: u32,
    pub remaining: u32,
    pub reset_after: u64,
    pub max_concurrency: u32,
}

/// `GET /gateway/bot` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayBot {
    pub url: String,
    pub shards: u32,
    pub session_start_limit: SessionStartLimit,
}

/// Message body accepted by all four send endpoints
///
/// Fields an endpoint does not understand are ignored by the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// 0 text, 1 mixed, 2 markdown, 3 ark, 4 embed, 7 media
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_type: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ark: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Distinguishes several replies to the same `msg_id`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_seq: Option<u32>,
}

impl OutgoingMessage {
    /// Plain text message
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            msg_type: Some(0),
            ..Self::default()
        }
    }

    /// Fill in the reply correlation id unless one was set explicitly
    #[must_use]
    pub fn correlated(mut self, correlation: &Correlation) -> Self {
        match correlation {
            Correlation::MsgId(id) => {
                self.msg_id.get_or_insert_with(|| id.clone());
            }
            Correlation::EventId(id) => {
                self.event_id.get_or_insert_with(|| id.clone());
            }
        }
        self
    }
}

/// Response of a send endpoint
///
/// Channel endpoints return a full message object, group and user endpoints only
/// `{id, timestamp}`; everything beyond `id` is kept as raw JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SentMessage {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
