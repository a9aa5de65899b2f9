//! In-process transport for engine tests

use super::{Transport, TransportEvent, TransportStream};
use crate::error::TransportError;
use crate::protocol::GatewayMessage;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// A frame written by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ClientFrame {
    Text(String),
    Close(u16),
}

/// Server end of one accepted connection
pub(crate) struct ServerSide {
    pub to_client: mpsc::UnboundedSender<TransportEvent>,
    pub from_client: mpsc::UnboundedReceiver<ClientFrame>,
}

impl ServerSide {
    pub fn send_json(&self, value: Value) {
        let _ = self.to_client.send(TransportEvent::Text(value.to_string()));
    }

    pub fn close(&self, code: u16) {
        let _ = self.to_client.send(TransportEvent::Closed {
            code: Some(code),
            reason: String::new(),
        });
    }

    /// Next text frame from the client; `None` once it closed or went away
    pub async fn next_message(&mut self) -> Option<GatewayMessage> {
        match self.from_client.recv().await? {
            ClientFrame::Text(text) => GatewayMessage::from_json(&text).ok(),
            ClientFrame::Close(_) => None,
        }
    }
}

/// Transport handing each accepted connection to the test through a channel
pub(crate) struct MemoryTransport {
    attempts: AtomicUsize,
    refuse: AtomicBool,
    accept: mpsc::UnboundedSender<ServerSide>,
}

impl MemoryTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ServerSide>) {
        let (accept, accepted) = mpsc::unbounded_channel();
        let transport = Self {
            attempts: AtomicUsize::new(0),
            refuse: AtomicBool::new(false),
            accept,
        };
        (transport, accepted)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn connect(&self, url: &str) -> Result<Box<dyn TransportStream>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::Connect {
                url: url.to_string(),
                reason: "refused".to_string(),
            });
        }

        let (to_client, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_client) = mpsc::unbounded_channel();
        self.accept
            .send(ServerSide { to_client, from_client })
            .map_err(|_| TransportError::Closed)?;

        Ok(Box::new(MemoryStream { incoming, outgoing }))
    }
}

struct MemoryStream {
    incoming: mpsc::UnboundedReceiver<TransportEvent>,
    outgoing: mpsc::UnboundedSender<ClientFrame>,
}

#[async_trait]
impl TransportStream for MemoryStream {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.outgoing.send(ClientFrame::Text(text)).map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<TransportEvent> {
        self.incoming.recv().await
    }

    async fn close(&mut self, code: u16, _reason: &str) -> Result<(), TransportError> {
        let _ = self.outgoing.send(ClientFrame::Close(code));
        self.incoming.close();
        Ok(())
    }
}
