//! Request configuration
//!
//! Every outgoing request is described by a [`RequestConfig`] value. Callers customise
//! requests by registering pure `RequestConfig -> RequestConfig` transforms on the client;
//! the config itself is never mutated in place.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// HTTP methods used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one request
#[derive(Clone, PartialEq)]
pub struct RequestConfig {
    pub method: Method,
    pub base_url: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestConfig {
    #[must_use]
    pub fn new(method: Method, base_url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Return a copy with `name` set to `value`, replacing any previous value
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Look up a header value (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Full request URL
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("RequestConfig")
            .field("method", &self.method)
            .field("url", &self.url())
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}

/// A pure request transform
pub type RequestTransform = Arc<dyn Fn(RequestConfig) -> RequestConfig + Send + Sync>;

/// Run `config` through every transform in order
#[must_use]
pub fn apply_transforms(config: RequestConfig, transforms: &[RequestTransform]) -> RequestConfig {
    transforms
        .iter()
        .fold(config, |config, transform| transform(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joins_base_and_path() {
        let config = RequestConfig::new(Method::Get, "https://api.sgroup.qq.com/", "/gateway");
        assert_eq!(config.url(), "https://api.sgroup.qq.com/gateway");
    }

    #[test]
    fn test_with_header_replaces() {
        let config = RequestConfig::new(Method::Get, "http://x", "/")
            .with_header("X-Trace", "1")
            .with_header("x-trace", "2");
        assert_eq!(config.headers.len(), 1);
        assert_eq!(config.header("X-TRACE"), Some("2"));
    }

    #[test]
    fn test_transforms_apply_in_order() {
        let transforms: Vec<RequestTransform> = vec![
            Arc::new(|c: RequestConfig| c.with_header("X-Step", "one")),
            Arc::new(|c: RequestConfig| {
                let previous = c.header("X-Step").unwrap_or_default().to_string();
                c.with_header("X-Step", format!("{previous},two"))
            }),
        ];

        let original = RequestConfig::new(Method::Post, "http://x", "/y").with_body(json!({"a": 1}));
        let transformed = apply_transforms(original.clone(), &transforms);

        assert_eq!(transformed.header("X-Step"), Some("one,two"));
        assert_eq!(original.header("X-Step"), None);
        assert_eq!(transformed.body, original.body);
    }

    #[test]
    fn test_debug_redacts_authorization() {
        let config = RequestConfig::new(Method::Get, "http://x", "/")
            .with_header("Authorization", "QQBot secret");
        assert!(!format!("{config:?}").contains("secret"));
    }
}
