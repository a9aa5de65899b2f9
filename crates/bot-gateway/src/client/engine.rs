//! Session engine task
//!
//! One task per session. It obtains a credential, opens the transport and then runs a
//! single `select!` loop over application commands, the heartbeat deadline, the handshake
//! deadline and inbound frames. Frame handling and routing happen on this task in arrival
//! order. When the connection is lost the task backs off, forces a credential renewal and
//! reconnects until the session closes.

use super::handle::{CloseReason, Command};
use crate::events::DispatchRouter;
use crate::protocol::{codec, Decoded, GatewayMessage};
use crate::session::{HeartbeatMonitor, HeartbeatTick, LossOutcome, Session, SessionAction, SessionSnapshot};
use crate::transport::{Transport, TransportEvent, TransportStream};
use bot_common::CredentialProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, sleep_until, Instant};

/// Close code sent when the client drops a connection it intends to resume
const RECONNECT_CLOSE_CODE: u16 = 4000;

/// Close code sent on application disconnect
const NORMAL_CLOSE_CODE: u16 = 1000;

/// Deadline used for disabled timers
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400 * 365)
}

/// How one connection attempt ended
#[derive(Debug)]
enum Attempt {
    /// Lost; back off and try again
    Lost,
    Disconnect,
    CredentialFailed(String),
    Fatal { code: Option<u16> },
    Aborted(String),
}

pub(crate) struct Engine {
    url: String,
    session: Session,
    heartbeat: HeartbeatMonitor,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    router: Arc<DispatchRouter>,
    commands: mpsc::Receiver<Command>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    closed_tx: watch::Sender<Option<CloseReason>>,
}

impl Engine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        url: String,
        session: Session,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        router: Arc<DispatchRouter>,
        commands: mpsc::Receiver<Command>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
        closed_tx: watch::Sender<Option<CloseReason>>,
    ) -> Self {
        Self {
            url,
            session,
            heartbeat: HeartbeatMonitor::new(),
            transport,
            credentials,
            router,
            commands,
            snapshot_tx,
            closed_tx,
        }
    }

    /// Run until the session closes
    pub(crate) async fn run(mut self) -> CloseReason {
        tracing::info!(url = %self.url, "Gateway session starting");

        let reason = self.run_attempts().await;

        self.heartbeat.stop();
        self.session.close();
        self.publish();

        if reason.is_requested() {
            tracing::info!("Gateway session closed by application");
        } else {
            tracing::error!(reason = %reason, "Gateway session is dead");
            self.router.emit_session_dead(&reason.to_string());
        }

        self.closed_tx.send_replace(Some(reason.clone()));
        reason
    }

    async fn run_attempts(&mut self) -> CloseReason {
        loop {
            match self.attempt().await {
                Attempt::Lost => {}
                Attempt::Disconnect => return CloseReason::Requested,
                Attempt::CredentialFailed(reason) => return CloseReason::CredentialFailed(reason),
                Attempt::Fatal { code } => return CloseReason::Fatal { code },
                Attempt::Aborted(reason) => return CloseReason::Aborted(reason),
            }

            let Some(delay) = self.session.next_reconnect() else {
                return CloseReason::ReconnectExhausted {
                    attempts: self.session.config().max_retries,
                };
            };
            self.publish();

            tokio::select! {
                biased;
                _ = self.commands.recv() => return CloseReason::Requested,
                () = sleep(delay) => {}
            }

            if let Err(reason) = self.renew_credential().await {
                return reason;
            }
        }
    }

    /// Force a credential renewal ahead of a reconnect
    async fn renew_credential(&mut self) -> Result<(), CloseReason> {
        tokio::select! {
            biased;
            _ = self.commands.recv() => Err(CloseReason::Requested),
            result = self.credentials.refresh() => result.map_err(|e| {
                tracing::error!(error = %e, "Failed to renew gateway credential");
                CloseReason::CredentialFailed(e.to_string())
            }),
        }
    }

    /// One connect, handshake and receive cycle
    async fn attempt(&mut self) -> Attempt {
        if let Err(e) = self.session.begin_connect() {
            return Attempt::Aborted(e.to_string());
        }
        self.publish();

        let authorization = tokio::select! {
            biased;
            _ = self.commands.recv() => return Attempt::Disconnect,
            result = self.credentials.authorization() => match result {
                Ok(authorization) => authorization,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to obtain gateway credential");
                    return Attempt::CredentialFailed(e.to_string());
                }
            },
        };

        let connected = tokio::select! {
            biased;
            _ = self.commands.recv() => return Attempt::Disconnect,
            result = self.transport.connect(&self.url) => result,
        };

        let mut stream = match connected {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "Gateway connection failed");
                return self.lost(None);
            }
        };

        if let Err(e) = self.session.on_open(authorization) {
            return Attempt::Aborted(e.to_string());
        }
        tracing::info!(url = %self.url, "Gateway transport open");
        self.publish();

        let handshake_deadline = Instant::now() + self.session.config().handshake_timeout;
        let outcome = self.drive(stream.as_mut(), handshake_deadline).await;
        self.heartbeat.stop();
        outcome
    }

    async fn drive(&mut self, stream: &mut dyn TransportStream, handshake_deadline: Instant) -> Attempt {
        loop {
            let heartbeat_due = self.heartbeat.is_running();
            let heartbeat_at = self.heartbeat.next_deadline().unwrap_or_else(far_future);
            let handshaking = self.session.state().is_handshaking();

            tokio::select! {
                biased;
                _ = self.commands.recv() => {
                    let _ = stream.close(NORMAL_CLOSE_CODE, "disconnect").await;
                    return Attempt::Disconnect;
                }
                () = sleep_until(heartbeat_at), if heartbeat_due => {
                    match self.heartbeat.poll(Instant::now()) {
                        HeartbeatTick::Beat => {
                            let frame = self.session.heartbeat_frame();
                            if let Err(e) = send(stream, &frame).await {
                                tracing::warn!(error = %e, "Failed to send heartbeat");
                                return self.lost(None);
                            }
                            tracing::trace!(sequence = ?self.session.sequence(), "Heartbeat sent");
                        }
                        HeartbeatTick::Expired => {
                            self.session.force_reconnect("heartbeat ack timeout");
                            let _ = stream.close(RECONNECT_CLOSE_CODE, "heartbeat ack timeout").await;
                            return self.lost(None);
                        }
                        HeartbeatTick::Idle => {}
                    }
                }
                () = sleep_until(handshake_deadline), if handshaking => {
                    self.session.force_reconnect("handshake timeout");
                    let _ = stream.close(RECONNECT_CLOSE_CODE, "handshake timeout").await;
                    return self.lost(None);
                }
                event = stream.recv() => match event {
                    Some(TransportEvent::Text(text)) => {
                        if let Some(outcome) = self.handle_text(stream, &text).await {
                            return outcome;
                        }
                    }
                    Some(TransportEvent::Closed { code, reason }) => {
                        tracing::info!(code = ?code, reason = %reason, "Gateway closed connection");
                        return self.lost(code);
                    }
                    Some(TransportEvent::Error(e)) => {
                        tracing::warn!(error = %e, "Gateway connection error");
                        return self.lost(None);
                    }
                    None => return self.lost(None),
                },
            }
        }
    }

    async fn handle_text(&mut self, stream: &mut dyn TransportStream, text: &str) -> Option<Attempt> {
        let frame = match codec::decode(text) {
            Ok(Decoded::Frame(frame)) => frame,
            Ok(Decoded::Unknown { op }) => {
                tracing::debug!(op, "Ignoring frame with unhandled op code");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dropping undecodable frame");
                return None;
            }
        };

        tracing::trace!(op = %frame.op(), "Frame received");

        for action in self.session.on_frame(frame) {
            match action {
                SessionAction::Send(message) => {
                    if let Err(e) = send(stream, &message).await {
                        tracing::warn!(error = %e, op = %message.op, "Failed to send frame");
                        return Some(self.lost(None));
                    }
                }
                SessionAction::Route(dispatch) => {
                    self.router.route(dispatch);
                }
                SessionAction::StartHeartbeat(interval) => {
                    tracing::info!(
                        interval_ms = interval.as_millis() as u64,
                        session_id = ?self.session.session_id(),
                        "Session active"
                    );
                    self.heartbeat
                        .start(interval, self.session.config().heartbeat_grace, Instant::now());
                }
                SessionAction::HeartbeatAcked => {
                    if let Some(latency) = self.heartbeat.acknowledge(Instant::now()) {
                        tracing::debug!(latency_ms = latency.as_millis() as u64, "Heartbeat acknowledged");
                    }
                }
                SessionAction::CloseTransport => {
                    self.heartbeat.stop();
                    let _ = stream.close(RECONNECT_CLOSE_CODE, "reconnecting").await;
                    return Some(self.lost(None));
                }
            }
        }

        self.publish();
        None
    }

    fn lost(&mut self, code: Option<u16>) -> Attempt {
        self.heartbeat.stop();
        let outcome = match self.session.on_transport_lost(code) {
            LossOutcome::Reconnect(_) => Attempt::Lost,
            LossOutcome::Fatal { code } => Attempt::Fatal { code },
        };
        self.publish();
        outcome
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.session.snapshot());
    }
}

async fn send(stream: &mut dyn TransportStream, message: &GatewayMessage) -> Result<(), crate::GatewayError> {
    let text = codec::encode(message)?;
    stream.send(text).await?;
    Ok(())
}
