//! Session state machine
//!
//! [`Session`] owns lifecycle state, sequencing and resume identity. It performs no I/O:
//! the engine feeds it transport events and decoded frames and carries out the returned
//! [`SessionAction`]s in order.

use super::{GatewayConfig, ReconnectPath, ReconnectPolicy, SessionState};
use crate::error::SessionError;
use crate::events::Dispatch;
use crate::protocol::{close_disposition, CloseDisposition, GatewayMessage, IdentifyPayload, InboundFrame, ReadyPayload, ResumePayload};
use std::time::Duration;

/// Work the engine must do after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Write a frame to the transport
    Send(GatewayMessage),
    /// Hand a dispatch to the router
    Route(Dispatch),
    /// Begin heartbeating at the given interval
    StartHeartbeat(Duration),
    /// A heartbeat was acknowledged
    HeartbeatAcked,
    /// Close the transport and go through the reconnect path
    CloseTransport,
}

/// What to do after the transport went away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossOutcome {
    /// Back off and reconnect along the given path
    Reconnect(ReconnectPath),
    /// The close code rules out retrying
    Fatal { code: Option<u16> },
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub sequence: Option<u64>,
    pub session_id: Option<String>,
    pub retry_count: u32,
    pub heartbeat_interval: Option<Duration>,
}

/// Gateway session
#[derive(Debug)]
pub struct Session {
    config: GatewayConfig,
    policy: ReconnectPolicy,
    state: SessionState,
    sequence: Option<u64>,
    session_id: Option<String>,
    path: ReconnectPath,
    retry_count: u32,
    heartbeat_interval: Option<Duration>,
    authorization: String,
    /// Set after an authentication-failure close until the session is active again
    reauthenticating: bool,
}

impl Session {
    #[must_use]
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            policy: config.reconnect_policy(),
            config,
            state: SessionState::Idle,
            sequence: None,
            session_id: None,
            path: ReconnectPath::Fresh,
            retry_count: 0,
            heartbeat_interval: None,
            authorization: String::new(),
            reauthenticating: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    #[must_use]
    pub fn reconnect_path(&self) -> ReconnectPath {
        self.path
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            sequence: self.sequence,
            session_id: self.session_id.clone(),
            retry_count: self.retry_count,
            heartbeat_interval: self.heartbeat_interval,
        }
    }

    /// Check if Hello should be answered with Resume
    #[must_use]
    pub fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.sequence.is_some()
    }

    /// Heartbeat frame carrying the current sequence
    #[must_use]
    pub fn heartbeat_frame(&self) -> GatewayMessage {
        GatewayMessage::heartbeat(self.sequence)
    }

    /// Idle/Reconnecting → Connecting
    pub fn begin_connect(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle | SessionState::Reconnecting => {
                self.state = SessionState::Connecting;
                Ok(())
            }
            from => Err(SessionError::InvalidTransition {
                from,
                action: "connect",
            }),
        }
    }

    /// Connecting → AwaitingHello
    ///
    /// `authorization` is the bearer value used for Identify or Resume on this connection.
    pub fn on_open(&mut self, authorization: impl Into<String>) -> Result<(), SessionError> {
        if self.state != SessionState::Connecting {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "open transport",
            });
        }

        self.authorization = authorization.into();
        self.retry_count = 0;
        self.state = SessionState::AwaitingHello;
        Ok(())
    }

    /// Apply a decoded frame
    pub fn on_frame(&mut self, frame: InboundFrame) -> Vec<SessionAction> {
        match frame {
            InboundFrame::Hello { heartbeat_interval } => self.on_hello(Duration::from_millis(heartbeat_interval)),
            InboundFrame::Dispatch {
                sequence,
                event_type,
                data,
            } => self.on_dispatch(sequence, event_type, data),
            InboundFrame::HeartbeatAck => vec![SessionAction::HeartbeatAcked],
            InboundFrame::Heartbeat => {
                tracing::debug!(sequence = ?self.sequence, "Server requested heartbeat");
                vec![SessionAction::Send(self.heartbeat_frame())]
            }
            InboundFrame::Reconnect => {
                tracing::info!("Gateway requested reconnect");
                self.enter_reconnecting(self.resume_path());
                vec![SessionAction::CloseTransport]
            }
            InboundFrame::InvalidSession { resumable } => {
                tracing::warn!(resumable, "Session invalidated, re-identifying");
                self.clear_identity();
                self.enter_reconnecting(ReconnectPath::Fresh);
                vec![SessionAction::CloseTransport]
            }
            InboundFrame::HttpCallbackAck => {
                tracing::debug!("HTTP callback acknowledged");
                Vec::new()
            }
        }
    }

    fn on_hello(&mut self, interval: Duration) -> Vec<SessionAction> {
        if self.state != SessionState::AwaitingHello {
            tracing::warn!(state = %self.state, "Ignoring unexpected Hello");
            return Vec::new();
        }

        self.heartbeat_interval = Some(interval);

        let resume = match (&self.session_id, self.sequence, self.path) {
            (Some(session_id), Some(seq), ReconnectPath::Resume) => Some(ResumePayload {
                token: self.authorization.clone(),
                session_id: session_id.clone(),
                seq,
            }),
            _ => None,
        };

        let frame = match resume {
            Some(payload) => {
                tracing::info!(session_id = %payload.session_id, seq = payload.seq, "Resuming session");
                self.state = SessionState::Resuming;
                GatewayMessage::resume(&payload)
            }
            None => {
                tracing::info!(intents = %self.config.intents, "Identifying");
                // A fresh session restarts the server's numbering
                self.sequence = None;
                self.session_id = None;
                self.state = SessionState::Authenticating;
                let payload = IdentifyPayload::new(self.authorization.clone(), self.config.intents)
                    .with_shard(self.config.shard[0], self.config.shard[1])
                    .with_properties(self.config.properties.clone());
                GatewayMessage::identify(&payload)
            }
        };

        vec![SessionAction::Send(frame)]
    }

    fn on_dispatch(&mut self, sequence: Option<u64>, event_type: String, data: serde_json::Value) -> Vec<SessionAction> {
        let mut actions = Vec::with_capacity(2);

        match (sequence, self.sequence) {
            (Some(seq), Some(current)) if seq < current => {
                tracing::warn!(seq, current, event_type = %event_type, "Ignoring lower sequence");
            }
            (Some(seq), _) => self.sequence = Some(seq),
            (None, _) => {}
        }

        match event_type.as_str() {
            "READY" => match serde_json::from_value::<ReadyPayload>(data.clone()) {
                Ok(ready) => {
                    tracing::info!(
                        session_id = %ready.session_id,
                        username = %ready.user.username,
                        "Session ready"
                    );
                    self.session_id = Some(ready.session_id);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "READY payload missing session identity");
                }
            },
            "RESUMED" => {
                tracing::info!(session_id = ?self.session_id, "Session resumed");
            }
            _ => {}
        }

        if matches!(self.state, SessionState::Authenticating | SessionState::Resuming) {
            self.state = SessionState::Active;
            self.reauthenticating = false;
            if let Some(interval) = self.heartbeat_interval {
                actions.push(SessionAction::StartHeartbeat(interval));
            }
        }

        actions.push(SessionAction::Route(Dispatch::new(event_type, sequence, data)));
        actions
    }

    /// Transport closed or errored without the application asking for it
    pub fn on_transport_lost(&mut self, code: Option<u16>) -> LossOutcome {
        if self.state == SessionState::Reconnecting {
            return LossOutcome::Reconnect(self.path);
        }

        match close_disposition(code) {
            CloseDisposition::Fatal => {
                tracing::error!(code = ?code, "Gateway closed with a non-retryable code");
                self.state = SessionState::Closed;
                LossOutcome::Fatal { code }
            }
            CloseDisposition::Reauthenticate if self.reauthenticating => {
                tracing::error!(code = ?code, "Gateway rejected the renewed credential");
                self.state = SessionState::Closed;
                LossOutcome::Fatal { code }
            }
            CloseDisposition::Reauthenticate => {
                tracing::warn!(code = ?code, "Gateway rejected the credential, identifying again after renewal");
                self.reauthenticating = true;
                self.clear_identity();
                self.enter_reconnecting(ReconnectPath::Fresh);
                LossOutcome::Reconnect(ReconnectPath::Fresh)
            }
            CloseDisposition::Fresh => {
                tracing::warn!(code = ?code, "Gateway closed, session must be re-identified");
                self.clear_identity();
                self.enter_reconnecting(ReconnectPath::Fresh);
                LossOutcome::Reconnect(ReconnectPath::Fresh)
            }
            CloseDisposition::Resume => {
                let path = self.resume_path();
                tracing::warn!(code = ?code, path = %path, "Gateway connection lost");
                self.enter_reconnecting(path);
                LossOutcome::Reconnect(path)
            }
        }
    }

    /// Drop the current connection because it stopped responding
    pub fn force_reconnect(&mut self, reason: &str) {
        let path = self.resume_path();
        tracing::warn!(reason, path = %path, "Forcing reconnect");
        self.enter_reconnecting(path);
    }

    /// Count the next attempt and return its backoff, or `None` once attempts are exhausted
    pub fn next_reconnect(&mut self) -> Option<Duration> {
        self.retry_count += 1;

        if !self.policy.allows(self.retry_count) {
            tracing::error!(
                attempts = self.retry_count - 1,
                max_retries = self.policy.max_retries,
                "Reconnect attempts exhausted"
            );
            self.state = SessionState::Closed;
            return None;
        }

        let delay = self.policy.backoff(self.retry_count);
        tracing::info!(
            attempt = self.retry_count,
            max_retries = self.policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        self.state = SessionState::Reconnecting;
        Some(delay)
    }

    /// Enter the terminal state
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    fn resume_path(&self) -> ReconnectPath {
        if self.can_resume() {
            ReconnectPath::Resume
        } else {
            ReconnectPath::Fresh
        }
    }

    fn enter_reconnecting(&mut self, path: ReconnectPath) {
        self.path = path;
        self.state = SessionState::Reconnecting;
    }

    fn clear_identity(&mut self) {
        self.session_id = None;
        self.sequence = None;
    }
}
