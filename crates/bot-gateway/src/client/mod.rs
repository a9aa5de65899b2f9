//! Gateway client
//!
//! [`GatewayClient`] starts sessions; each [`SessionHandle`] controls one running session.

mod builder;
mod engine;
mod handle;

pub use builder::{GatewayClient, GatewayClientBuilder};
pub use handle::{CloseReason, SessionHandle};
