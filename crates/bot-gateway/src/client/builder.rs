//! Gateway client construction

use super::engine::Engine;
use super::handle::SessionHandle;
use crate::error::GatewayError;
use crate::events::DispatchRouter;
use crate::session::{GatewayConfig, Session, SessionSnapshot};
use crate::transport::{Transport, WsTransport};
use bot_common::CredentialProvider;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::Instrument;

/// Command buffer per session; only disconnects travel through it
const COMMAND_BUFFER: usize = 4;

/// Factory for gateway sessions sharing one configuration, credential and router
#[derive(Clone)]
pub struct GatewayClient {
    config: GatewayConfig,
    credentials: Arc<dyn CredentialProvider>,
    transport: Arc<dyn Transport>,
    router: Arc<DispatchRouter>,
    span: tracing::Span,
}

impl GatewayClient {
    #[must_use]
    pub fn builder() -> GatewayClientBuilder {
        GatewayClientBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Router receiving this client's dispatches
    #[must_use]
    pub fn router(&self) -> &Arc<DispatchRouter> {
        &self.router
    }

    /// Start a session against `url`
    ///
    /// Spawns the session task on the current tokio runtime and returns immediately.
    pub fn connect(&self, url: impl Into<String>) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let (closed_tx, closed_rx) = watch::channel(None);

        let engine = Engine::new(
            url.into(),
            Session::new(self.config.clone()),
            Arc::clone(&self.transport),
            Arc::clone(&self.credentials),
            Arc::clone(&self.router),
            command_rx,
            snapshot_tx,
            closed_tx,
        );

        tokio::spawn(engine.run().instrument(self.span.clone()));

        SessionHandle::new(command_tx, snapshot_rx, closed_rx)
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("config", &self.config)
            .field("router", &self.router)
            .finish()
    }
}

/// Builder for [`GatewayClient`]
#[derive(Default)]
pub struct GatewayClientBuilder {
    config: Option<GatewayConfig>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    transport: Option<Arc<dyn Transport>>,
    router: Option<Arc<DispatchRouter>>,
    span: Option<tracing::Span>,
}

impl GatewayClientBuilder {
    /// Session settings (required)
    #[must_use]
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Credential provider (required)
    #[must_use]
    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Transport, defaults to [`WsTransport`]
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Router, defaults to [`DispatchRouter::new`]
    #[must_use]
    pub fn router(mut self, router: Arc<DispatchRouter>) -> Self {
        self.router = Some(router);
        self
    }

    /// Span the session task is instrumented with, defaults to `gateway`
    #[must_use]
    pub fn span(mut self, span: tracing::Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> Result<GatewayClient, GatewayError> {
        let config = self.config.ok_or(GatewayError::MissingConfig)?;
        let credentials = self.credentials.ok_or(GatewayError::MissingCredentials)?;

        let span = self.span.unwrap_or_else(|| {
            tracing::info_span!(
                "gateway",
                intents = %config.intents,
                shard = ?config.shard
            )
        });

        Ok(GatewayClient {
            config,
            credentials,
            transport: self.transport.unwrap_or_else(|| Arc::new(WsTransport)),
            router: self.router.unwrap_or_else(|| Arc::new(DispatchRouter::new())),
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_common::StaticCredential;
    use bot_core::Intents;

    #[test]
    fn test_build_requires_credentials() {
        let result = GatewayClient::builder()
            .config(GatewayConfig::new(Intents::GUILDS))
            .build();
        assert!(matches!(result, Err(GatewayError::MissingCredentials)));
    }

    #[test]
    fn test_build_requires_config() {
        let result = GatewayClient::builder()
            .credentials(Arc::new(StaticCredential::new("QQBot t")))
            .build();
        assert!(matches!(result, Err(GatewayError::MissingConfig)));
    }

    #[test]
    fn test_build_with_defaults() {
        let client = GatewayClient::builder()
            .config(GatewayConfig::new(Intents::GUILDS).with_max_retries(7))
            .credentials(Arc::new(StaticCredential::new("QQBot t")))
            .build()
            .unwrap();

        assert_eq!(client.config().max_retries, 7);
        assert_eq!(client.router().subscriber_count(&bot_core::EventName::SessionReady), 0);
    }
}
