//! Wire codec
//!
//! Decodes inbound text frames into [`InboundFrame`] and encodes outbound
//! [`GatewayMessage`]s. Opcodes the client does not understand decode to
//! [`Decoded::Unknown`] so the caller can log and drop them without failing.

use super::{GatewayMessage, HelloPayload, OpCode};
use serde::Deserialize;
use serde_json::Value;

/// A decoded server frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// op 0
    Dispatch {
        sequence: Option<u64>,
        event_type: String,
        data: Value,
    },
    /// op 1, the server asks for an immediate heartbeat
    Heartbeat,
    /// op 11
    HeartbeatAck,
    /// op 10
    Hello { heartbeat_interval: u64 },
    /// op 7
    Reconnect,
    /// op 9
    InvalidSession { resumable: bool },
    /// op 12
    HttpCallbackAck,
}

impl InboundFrame {
    /// Op code of this frame
    #[must_use]
    pub fn op(&self) -> OpCode {
        match self {
            Self::Dispatch { .. } => OpCode::Dispatch,
            Self::Heartbeat => OpCode::Heartbeat,
            Self::HeartbeatAck => OpCode::HeartbeatAck,
            Self::Hello { .. } => OpCode::Hello,
            Self::Reconnect => OpCode::Reconnect,
            Self::InvalidSession { .. } => OpCode::InvalidSession,
            Self::HttpCallbackAck => OpCode::HttpCallbackAck,
        }
    }
}

/// Result of decoding one frame
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Frame(InboundFrame),
    /// Well-formed envelope with an op code the client ignores
    Unknown { op: u8 },
}

/// Frame decoding errors
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame with op {op} is missing field `{field}`")]
    MissingField { op: u8, field: &'static str },

    #[error("Invalid payload for op {op}: {reason}")]
    InvalidPayload { op: u8, reason: String },
}

/// Frame encoding errors
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Failed to encode frame: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RawEnvelope {
    op: u8,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
    #[serde(default)]
    d: Value,
}

/// Decode a text frame received from the gateway
pub fn decode(text: &str) -> Result<Decoded, DecodeError> {
    let raw: RawEnvelope = serde_json::from_str(text)?;

    let Some(op) = OpCode::from_u8(raw.op) else {
        return Ok(Decoded::Unknown { op: raw.op });
    };

    let frame = match op {
        OpCode::Dispatch => InboundFrame::Dispatch {
            sequence: raw.s,
            event_type: raw
                .t
                .filter(|t| !t.is_empty())
                .ok_or(DecodeError::MissingField { op: raw.op, field: "t" })?,
            data: raw.d,
        },
        OpCode::Heartbeat => InboundFrame::Heartbeat,
        OpCode::HeartbeatAck => InboundFrame::HeartbeatAck,
        OpCode::Hello => {
            let hello: HelloPayload = serde_json::from_value(raw.d).map_err(|e| DecodeError::InvalidPayload {
                op: raw.op,
                reason: e.to_string(),
            })?;
            if hello.heartbeat_interval == 0 {
                return Err(DecodeError::InvalidPayload {
                    op: raw.op,
                    reason: "heartbeat_interval must be positive".to_string(),
                });
            }
            InboundFrame::Hello {
                heartbeat_interval: hello.heartbeat_interval,
            }
        }
        OpCode::Reconnect => InboundFrame::Reconnect,
        OpCode::InvalidSession => InboundFrame::InvalidSession {
            resumable: raw.d.as_bool().unwrap_or(false),
        },
        OpCode::HttpCallbackAck => InboundFrame::HttpCallbackAck,
        // Client-only op codes never arrive from the server
        OpCode::Identify | OpCode::Resume => return Ok(Decoded::Unknown { op: raw.op }),
    };

    Ok(Decoded::Frame(frame))
}

/// Encode an outbound message as a text frame
pub fn encode(message: &GatewayMessage) -> Result<String, EncodeError> {
    Ok(message.to_json()?)
}
