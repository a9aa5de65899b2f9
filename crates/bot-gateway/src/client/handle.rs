//! Application handle to a running session

use crate::session::{SessionSnapshot, SessionState};
use std::fmt;
use tokio::sync::{mpsc, watch};

/// Commands sent from a [`SessionHandle`] to its engine task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Disconnect,
}

/// Why a session stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The application called [`SessionHandle::disconnect`]
    Requested,
    /// Every reconnect attempt failed
    ReconnectExhausted { attempts: u32 },
    /// No usable credential could be obtained
    CredentialFailed(String),
    /// The gateway closed with a code that rules out retrying
    Fatal { code: Option<u16> },
    /// The engine stopped on an internal error
    Aborted(String),
}

impl CloseReason {
    #[must_use]
    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Requested)
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("disconnect requested"),
            Self::ReconnectExhausted { attempts } => {
                write!(f, "reconnect exhausted after {attempts} attempts")
            }
            Self::CredentialFailed(reason) => write!(f, "credential failure: {reason}"),
            Self::Fatal { code: Some(code) } => write!(f, "fatal close code {code}"),
            Self::Fatal { code: None } => f.write_str("fatal close"),
            Self::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// Handle to a session started by [`GatewayClient::connect`](super::GatewayClient::connect)
///
/// Dropping the handle disconnects the session.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<SessionSnapshot>,
    closed: watch::Receiver<Option<CloseReason>>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<Command>,
        snapshot: watch::Receiver<SessionSnapshot>,
        closed: watch::Receiver<Option<CloseReason>>,
    ) -> Self {
        Self {
            commands,
            snapshot,
            closed,
        }
    }

    /// Stop the session
    ///
    /// Cancels any pending backoff and closes the transport. Calling it again, or after the
    /// session already stopped, has no effect.
    pub fn disconnect(&self) {
        if self.commands.try_send(Command::Disconnect).is_ok() {
            tracing::debug!("Disconnect requested");
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Close reason, if the session already stopped
    #[must_use]
    pub fn close_reason(&self) -> Option<CloseReason> {
        self.closed.borrow().clone()
    }

    /// Wait until the session stops
    pub async fn closed(&self) -> CloseReason {
        let mut closed = self.closed.clone();
        let reason = match closed.wait_for(Option::is_some).await {
            Ok(reason) => reason.clone().unwrap_or_else(|| CloseReason::Aborted("no close reason".to_string())),
            Err(_) => CloseReason::Aborted("engine task ended".to_string()),
        };
        reason
    }

    /// Wait until the session reaches `state` or stops
    pub async fn wait_for_state(&self, state: SessionState) -> SessionState {
        let mut snapshot = self.snapshot.clone();
        let state = match snapshot.wait_for(|s| s.state == state || s.state.is_terminal()).await {
            Ok(s) => s.state,
            Err(_) => SessionState::Closed,
        };
        state
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let _ = self.commands.try_send(Command::Disconnect);
    }
}
