//! # bot-api
//!
//! Thin REST client for the bot open platform: gateway lookup and the message endpoints
//! used to answer events.

pub mod client;
pub mod error;
pub mod models;
pub mod request;

pub use client::{ApiConfig, HttpApi, API_ORIGIN, SANDBOX_API_ORIGIN};
pub use error::ApiError;
pub use models::{GatewayBot, GatewayInfo, OutgoingMessage, SentMessage, SessionStartLimit};
pub use request::{Method, RequestConfig, RequestTransform};
