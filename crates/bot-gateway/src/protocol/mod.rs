//! Gateway protocol definitions
//!
//! Defines the WebSocket protocol including op codes, message formats, close codes and the
//! wire codec.

pub mod codec;
mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::{close_disposition, CloseCode, CloseDisposition, INTERNAL_ERROR_RANGE};
pub use codec::{decode, encode, DecodeError, Decoded, EncodeError, InboundFrame};
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, ReadyPayload, ReadyUser, ResumePayload};
