//! # bot-gateway
//!
//! Client for the bot WebSocket push gateway: handshake, heartbeat, reconnect and resume,
//! and routing of dispatches to hierarchical event subscribers.

pub mod client;
pub mod error;
pub mod events;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-export commonly used types at crate root
pub use client::{CloseReason, GatewayClient, GatewayClientBuilder, SessionHandle};
pub use error::{GatewayError, GatewayResult, SessionError, TransportError};
pub use events::{Dispatch, DispatchEvent, DispatchInterceptor, DispatchRouter, SubscriptionId};
pub use session::{GatewayConfig, SessionSnapshot, SessionState};
