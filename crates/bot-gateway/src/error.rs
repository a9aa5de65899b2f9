//! Gateway error types

use crate::protocol::EncodeError;
use crate::session::SessionState;
use thiserror::Error;

/// Transport-level failures
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not open the connection
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Could not write a frame
    #[error("Failed to send frame: {0}")]
    Send(String),

    /// The connection is already closed
    #[error("Connection closed")]
    Closed,

    /// Transport-level protocol violation
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Session state machine misuse
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Cannot {action} while session is {from}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },
}

/// Gateway client errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No credential provider was configured
    #[error("Gateway client requires a credential provider")]
    MissingCredentials,

    /// No session configuration was given
    #[error("Gateway client requires a configuration")]
    MissingConfig,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
