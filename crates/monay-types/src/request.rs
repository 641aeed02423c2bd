//! Transport-neutral request and response shapes
//!
//! Rail adapters produce `RequestSpec`s and consume `RailResponse`s without
//! knowing anything about the HTTP client that carries them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// HTTP methods used against rail endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Description of one outbound call
///
/// The pipeline never mutates a `RequestSpec`; a retry re-issues the same
/// spec with a fresh `Authorization` header.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Path relative to the configured endpoint, starting with `/`
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Overrides the pipeline's default timeout
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            headers: Vec::new(),
            body: Some(body),
            timeout: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A rail's HTTP answer, already decoded as JSON
#[derive(Debug, Clone, PartialEq)]
pub struct RailResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl RailResponse {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let spec = RequestSpec::post("/api/stripe/charge", json!({}))
            .with_header("Idempotency-Key", "abc");
        assert_eq!(spec.header("idempotency-key"), Some("abc"));
        assert_eq!(spec.header("x-request-id"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(RailResponse::new(201, json!({})).is_success());
        assert!(!RailResponse::new(402, json!({})).is_success());
    }
}
