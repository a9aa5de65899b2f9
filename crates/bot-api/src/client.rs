//! HTTP API client
//!
//! Every call resolves the current credential, stamps the platform headers onto an
//! immutable [`RequestConfig`], runs the registered transforms, and maps `{code, message}`
//! error bodies onto [`ApiError::Remote`].

use bot_common::CredentialProvider;
use bot_core::ReplyTarget;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiError;
use crate::models::{GatewayBot, GatewayInfo, OutgoingMessage, SentMessage};
use crate::request::{apply_transforms, Method, RequestConfig, RequestTransform};

/// Production REST origin
pub const API_ORIGIN: &str = "https://api.sgroup.qq.com";

/// Sandbox REST origin
pub const SANDBOX_API_ORIGIN: &str = "https://sandbox.api.sgroup.qq.com";

/// Client settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub app_id: String,
    pub sandbox: bool,
    pub timeout: Duration,
    /// Overrides the production/sandbox origin
    pub origin: Option<String>,
}

impl ApiConfig {
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            sandbox: false,
            timeout: Duration::from_secs(10),
            origin: None,
        }
    }

    #[must_use]
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// The origin requests are sent to
    #[must_use]
    pub fn origin(&self) -> &str {
        match (&self.origin, self.sandbox) {
            (Some(origin), _) => origin,
            (None, true) => SANDBOX_API_ORIGIN,
            (None, false) => API_ORIGIN,
        }
    }
}

/// REST API client
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    config: ApiConfig,
    credentials: Arc<dyn CredentialProvider>,
    transforms: Vec<RequestTransform>,
}

impl HttpApi {
    /// Create a client
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(config: ApiConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            config,
            credentials,
            transforms: Vec::new(),
        })
    }

    /// Register a request transform, run after the platform headers are applied
    #[must_use]
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(RequestConfig) -> RequestConfig + Send + Sync + 'static,
    {
        self.transforms.push(Arc::new(transform));
        self
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `GET /gateway`
    pub async fn get_gateway(&self) -> Result<GatewayInfo, ApiError> {
        self.execute(self.request(Method::Get, "/gateway")).await
    }

    /// `GET /gateway/bot`
    pub async fn get_gateway_bot(&self) -> Result<GatewayBot, ApiError> {
        self.execute(self.request(Method::Get, "/gateway/bot")).await
    }

    /// `POST /channels/{channel_id}/messages`
    pub async fn send_channel_message(
        &self,
        channel_id: &str,
        message: &OutgoingMessage,
    ) -> Result<SentMessage, ApiError> {
        self.post_message(format!("/channels/{channel_id}/messages"), message).await
    }

    /// `POST /dms/{guild_id}/messages`
    pub async fn send_dm_message(
        &self,
        guild_id: &str,
        message: &OutgoingMessage,
    ) -> Result<SentMessage, ApiError> {
        self.post_message(format!("/dms/{guild_id}/messages"), message).await
    }

    /// `POST /v2/groups/{group_openid}/messages`
    pub async fn send_group_message(
        &self,
        group_openid: &str,
        message: &OutgoingMessage,
    ) -> Result<SentMessage, ApiError> {
        self.post_message(format!("/v2/groups/{group_openid}/messages"), message).await
    }

    /// `POST /v2/users/{openid}/messages`
    pub async fn send_user_message(
        &self,
        openid: &str,
        message: &OutgoingMessage,
    ) -> Result<SentMessage, ApiError> {
        self.post_message(format!("/v2/users/{openid}/messages"), message).await
    }

    /// Reply to the event a [`ReplyTarget`] was resolved from
    ///
    /// The target's correlation id is filled in as `msg_id` or `event_id` unless the message
    /// already carries one.
    pub async fn reply(
        &self,
        target: &ReplyTarget,
        message: OutgoingMessage,
    ) -> Result<SentMessage, ApiError> {
        let message = message.correlated(target.correlation());
        tracing::debug!(target = %target, "Sending reply");

        match target {
            ReplyTarget::Channel { channel_id, .. } => self.send_channel_message(channel_id, &message).await,
            ReplyTarget::DirectMessage { guild_id, .. } => self.send_dm_message(guild_id, &message).await,
            ReplyTarget::Group { group_openid, .. } => self.send_group_message(group_openid, &message).await,
            ReplyTarget::User { user_openid, .. } => self.send_user_message(user_openid, &message).await,
        }
    }

    fn request(&self, method: Method, path: impl Into<String>) -> RequestConfig {
        RequestConfig::new(method, self.config.origin(), path)
    }

    async fn post_message(&self, path: String, message: &OutgoingMessage) -> Result<SentMessage, ApiError> {
        let body = serde_json::to_value(message)?;
        self.execute(self.request(Method::Post, path).with_body(body)).await
    }

    /// Send a request and decode a successful JSON body into `T`
    pub async fn execute<T>(&self, config: RequestConfig) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let authorization = self.credentials.authorization().await?;
        let config = config
            .with_header("Authorization", authorization)
            .with_header("X-Union-Appid", self.config.app_id.clone());
        let config = apply_transforms(config, &self.transforms);

        tracing::debug!(method = %config.method, url = %config.url(), "Sending API request");

        let mut builder = self.client.request(config.method.into(), config.url());
        for (name, value) in &config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &config.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| remote_error(status.as_u16(), &body))
                .unwrap_or(ApiError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            tracing::warn!(method = %config.method, url = %config.url(), error = %err, "API request failed");
            return Err(err);
        }

        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        if let Some(err) = remote_error(status.as_u16(), &body) {
            tracing::warn!(method = %config.method, url = %config.url(), error = %err, "API returned an error body");
            return Err(err);
        }

        Ok(serde_json::from_value(body)?)
    }
}

impl fmt::Debug for HttpApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpApi")
            .field("config", &self.config)
            .field("transforms", &self.transforms.len())
            .finish_non_exhaustive()
    }
}

/// Map a `{code, message}` body to [`ApiError::Remote`]
fn remote_error(status: u16, body: &Value) -> Option<ApiError> {
    let code = body.get("code")?.as_i64()?;
    if code == 0 {
        return None;
    }
    let message = body.get("message")?.as_str()?.to_string();
    let trace_id = body
        .get("trace_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(ApiError::Remote {
        status,
        code,
        message,
        trace_id,
    })
}
