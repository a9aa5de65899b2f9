//! Session lifecycle
//!
//! State machine, heartbeat tracking and reconnect policy for a single gateway session.

mod config;
mod heartbeat;
mod machine;
mod reconnect;
mod state;

pub use config::GatewayConfig;
pub use heartbeat::{HeartbeatMonitor, HeartbeatTick};
pub use machine::{LossOutcome, Session, SessionAction, SessionSnapshot};
pub use reconnect::ReconnectPolicy;
pub use state::{ReconnectPath, SessionState};
