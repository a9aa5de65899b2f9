//! App access token provider
//!
//! Exchanges the bot's app id and client secret for a short-lived access token and keeps it
//! fresh.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tokio::sync::Mutex;

use super::credential::{CredentialError, CredentialProvider, AUTHORIZATION_SCHEME};

/// Token exchange endpoint
pub const ACCESS_TOKEN_URL: &str = "https://bots.qq.com/app/getAppAccessToken";

/// Renew tokens this long before they expire
const DEFAULT_RENEW_MARGIN_SECS: i64 = 60;

/// A cached access token
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Check if the token expires within `margin` of `now`
    #[must_use]
    pub fn expires_within(&self, margin: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= margin
    }

    /// Header value for this token
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{AUTHORIZATION_SCHEME} {}", self.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    app_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Value,
}

/// Parse the endpoint's JSON body into a token issued at `now`
fn parse_token_response(body: Value, now: DateTime<Utc>) -> Result<AccessToken, CredentialError> {
    if body.get("access_token").is_none() {
        let code = body.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("missing access_token")
            .to_string();
        return Err(CredentialError::Rejected { code, message });
    }

    let response: TokenResponse = serde_json::from_value(body)
        .map_err(|e| CredentialError::InvalidResponse(e.to_string()))?;

    // expires_in arrives as either a number or a numeric string
    let expires_in = match &response.expires_in {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        CredentialError::InvalidResponse(format!("invalid expires_in: {}", response.expires_in))
    })?;

    let expires_at = Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| CredentialError::InvalidResponse(format!("expires_in out of range: {expires_in}")))?;

    Ok(AccessToken {
        value: response.access_token,
        expires_at,
    })
}

/// Access token provider backed by the token exchange endpoint
///
/// The cached token sits behind an async mutex so concurrent callers wait for a single
/// renewal instead of each hitting the endpoint.
pub struct AppAccessTokenProvider {
    client: reqwest::Client,
    endpoint: String,
    app_id: String,
    secret: String,
    renew_margin: Duration,
    cached: Mutex<Option<AccessToken>>,
}

impl AppAccessTokenProvider {
    /// Create a provider for the production token endpoint
    pub fn new(app_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: ACCESS_TOKEN_URL.to_string(),
            app_id: app_id.into(),
            secret: secret.into(),
            renew_margin: Duration::seconds(DEFAULT_RENEW_MARGIN_SECS),
            cached: Mutex::new(None),
        }
    }

    /// Use a different token endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies)
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Renew when the token expires within `margin`
    #[must_use]
    pub fn with_renew_margin(mut self, margin: Duration) -> Self {
        self.renew_margin = margin;
        self
    }

    async fn fetch(&self) -> Result<AccessToken, CredentialError> {
        tracing::debug!(app_id = %self.app_id, endpoint = %self.endpoint, "Requesting app access token");

        let body: Value = self
            .client
            .post(&self.endpoint)
            .json(&TokenRequest {
                app_id: &self.app_id,
                client_secret: &self.secret,
            })
            .send()
            .await?
            .json()
            .await?;

        let token = parse_token_response(body, Utc::now())?;
        tracing::info!(
            app_id = %self.app_id,
            expires_at = %token.expires_at,
            "App access token renewed"
        );
        Ok(token)
    }
}

impl fmt::Debug for AppAccessTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppAccessTokenProvider")
            .field("endpoint", &self.endpoint)
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialProvider for AppAccessTokenProvider {
    async fn authorization(&self) -> Result<String, CredentialError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.expires_within(self.renew_margin, Utc::now()) {
                return Ok(token.authorization());
            }
        }

        let token = self.fetch().await.inspect_err(|e| {
            tracing::error!(app_id = %self.app_id, error = %e, "Failed to renew app access token");
        })?;
        let authorization = token.authorization();
        *cached = Some(token);
        Ok(authorization)
    }

    async fn refresh(&self) -> Result<(), CredentialError> {
        let mut cached = self.cached.lock().await;
        *cached = Some(self.fetch().await?);
        Ok(())
    }
}
