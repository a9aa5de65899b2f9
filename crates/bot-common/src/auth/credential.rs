//! Credential provider abstraction
//!
//! The gateway and REST clients only need "a currently valid `Authorization` value" and a
//! way to force renewal; where the value comes from is up to the provider.

use async_trait::async_trait;
use std::fmt;

/// Prefix of every bot authorization header value
pub const AUTHORIZATION_SCHEME: &str = "QQBot";

/// Supplies the bearer value sent to the gateway and REST API
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Get a currently valid authorization value (e.g. `QQBot <token>`), renewing if needed
    async fn authorization(&self) -> Result<String, CredentialError>;

    /// Force renewal regardless of the cached value's expiry
    async fn refresh(&self) -> Result<(), CredentialError>;
}

/// Credential acquisition errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialError {
    #[error("Token request failed: {0}")]
    Request(String),

    #[error("Token endpoint rejected the request ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for CredentialError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

/// Fixed authorization value, never renewed
#[derive(Clone)]
pub struct StaticCredential {
    authorization: String,
}

impl StaticCredential {
    /// Use `authorization` verbatim as the header value
    pub fn new(authorization: impl Into<String>) -> Self {
        Self {
            authorization: authorization.into(),
        }
    }

    /// Build `QQBot <token>` from a bare access token
    pub fn from_access_token(token: impl fmt::Display) -> Self {
        Self::new(format!("{AUTHORIZATION_SCHEME} {token}"))
    }
}

impl fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredential").finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn authorization(&self) -> Result<String, CredentialError> {
        Ok(self.authorization.clone())
    }

    async fn refresh(&self) -> Result<(), CredentialError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credential() {
        let credential = StaticCredential::from_access_token("abc");
        assert_eq!(credential.authorization().await.unwrap(), "QQBot abc");
        credential.refresh().await.unwrap();
        assert_eq!(credential.authorization().await.unwrap(), "QQBot abc");
    }

    #[test]
    fn test_debug_hides_value() {
        let credential = StaticCredential::new("QQBot secret-token");
        assert!(!format!("{credential:?}").contains("secret-token"));
    }
}
