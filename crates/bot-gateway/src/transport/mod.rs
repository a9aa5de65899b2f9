//! Gateway transport
//!
//! A transport opens one full-duplex, message-oriented connection per session attempt.
//! [`WsTransport`] is the WebSocket implementation used in production.

mod websocket;

#[cfg(test)]
pub(crate) mod memory;

pub use websocket::WsTransport;

use crate::error::TransportError;
use async_trait::async_trait;

/// Something read from an open connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text frame
    Text(String),
    /// The peer closed the connection
    Closed { code: Option<u16>, reason: String },
    /// The connection failed
    Error(String),
}

/// Connection factory
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection to `url`
    async fn connect(&self, url: &str) -> Result<Box<dyn TransportStream>, TransportError>;
}

/// An open connection
///
/// `recv` must be cancel safe; the engine polls it inside `select!`.
#[async_trait]
pub trait TransportStream: Send {
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Next event, or `None` once the connection is gone
    async fn recv(&mut self) -> Option<TransportEvent>;

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), TransportError>;
}
