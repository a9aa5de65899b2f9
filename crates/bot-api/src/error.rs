//! REST client errors

use bot_common::CredentialError;

/// REST client error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a recognisable error body
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The platform returned a `{code, message}` error body
    #[error("API error {code}: {message}")]
    Remote {
        status: u16,
        code: i64,
        message: String,
        trace_id: Option<String>,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status of the failed response, if one was received
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Remote { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Credential(_) | Self::Decode(_) => None,
        }
    }

    /// Check if the credential was rejected and a renewal might help
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
