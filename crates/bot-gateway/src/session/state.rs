//! Session lifecycle states

use std::fmt;

/// Lifecycle state of a gateway session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Created, no connection requested yet
    #[default]
    Idle,
    /// Opening the transport
    Connecting,
    /// Transport open, waiting for Hello
    AwaitingHello,
    /// Identify sent, waiting for READY
    Authenticating,
    /// Resume sent, waiting for RESUMED
    Resuming,
    /// Receiving dispatches
    Active,
    /// Connection lost, waiting to reconnect
    Reconnecting,
    /// Stopped for good
    Closed,
}

impl SessionState {
    /// Check if the session is between transport open and the first dispatch
    #[must_use]
    pub const fn is_handshaking(self) -> bool {
        matches!(self, Self::AwaitingHello | Self::Authenticating | Self::Resuming)
    }

    /// Check if the session holds an open transport
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(
            self,
            Self::AwaitingHello | Self::Authenticating | Self::Resuming | Self::Active
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::AwaitingHello => "awaiting_hello",
            Self::Authenticating => "authenticating",
            Self::Resuming => "resuming",
            Self::Active => "active",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the next connection authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPath {
    /// Send Identify
    #[default]
    Fresh,
    /// Send Resume with the known session id and sequence
    Resume,
}

impl fmt::Display for ReconnectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => f.write_str("fresh"),
            Self::Resume => f.write_str("resume"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshaking_states() {
        assert!(SessionState::AwaitingHello.is_handshaking());
        assert!(SessionState::Resuming.is_handshaking());
        assert!(!SessionState::Active.is_handshaking());
        assert!(!SessionState::Connecting.is_handshaking());
    }

    #[test]
    fn test_connected_states() {
        assert!(SessionState::Active.is_connected());
        assert!(!SessionState::Reconnecting.is_connected());
        assert!(!SessionState::Closed.is_connected());
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionState::AwaitingHello.to_string(), "awaiting_hello");
        assert_eq!(ReconnectPath::Resume.to_string(), "resume");
    }
}
