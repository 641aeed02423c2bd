//! Refresh endpoint client
//!
//! `POST {endpoint}/auth/refresh {refreshToken} -> {accessToken, refreshToken?, expiresIn?}`

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::store::Credentials;

/// Performs one refresh round trip
///
/// Implementations do not touch the `TokenStore`; the coordinator owns that.
#[async_trait]
pub trait RefreshClient: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshResponse>;
}

/// Successful refresh payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    /// Rotated refresh token; absent when the server keeps the old one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

impl RefreshResponse {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_in: None,
        }
    }

    /// Build the replacement credentials, keeping `previous_refresh_token`
    /// when no rotated token was issued
    pub fn into_credentials(self, previous_refresh_token: &str) -> Credentials {
        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| previous_refresh_token.to_string());

        let mut credentials = Credentials::new(self.access_token, Some(refresh_token));
        if let Some(seconds) = self.expires_in {
            credentials = credentials.with_expires_at(Utc::now() + chrono::Duration::seconds(seconds));
        }
        credentials
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Refresh client backed by reqwest
#[derive(Clone)]
pub struct HttpRefreshClient {
    client: reqwest::Client,
    url: String,
}

impl HttpRefreshClient {
    /// Create a client for `endpoint` + `config.refresh_path`
    pub fn new(client: reqwest::Client, endpoint: &str, config: &AuthConfig) -> Self {
        Self {
            client,
            url: format!("{}{}", endpoint.trim_end_matches('/'), config.refresh_path),
        }
    }

    /// Get the refresh URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RefreshClient for HttpRefreshClient {
    async fn refresh(&self, refresh_token: &str) -> AuthResult<RefreshResponse> {
        let response = self
            .client
            .post(&self.url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::RefreshTimeout
                } else {
                    AuthError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AuthError::Transport(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::RefreshRejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))?;

        if body.access_token.is_empty() {
            return Err(AuthError::MalformedResponse("empty accessToken".to_string()));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpRefreshClient {
        HttpRefreshClient::new(reqwest::Client::new(), &server.uri(), &AuthConfig::default())
    }

    #[tokio::test]
    async fn refresh_posts_refresh_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_json(json!({ "refreshToken": "refresh-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "access-2",
                "refreshToken": "refresh-2",
                "expiresIn": 900
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server).refresh("refresh-1").await.unwrap();
        assert_eq!(response.access_token, "access-2");
        assert_eq!(response.refresh_token.as_deref(), Some("refresh-2"));
        assert_eq!(response.expires_in, Some(900));
    }

    #[tokio::test]
    async fn refresh_rejection_carries_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_string("refresh token expired"))
            .mount(&server)
            .await;

        let err = client_for(&server).refresh("stale").await.unwrap_err();
        assert_eq!(
            err,
            AuthError::RefreshRejected {
                status: 401,
                message: "refresh token expired".to_string()
            }
        );
        assert!(err.requires_reauthentication());
    }

    #[tokio::test]
    async fn refresh_server_error_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).refresh("refresh-1").await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
        assert!(!err.requires_reauthentication());
    }

    #[tokio::test]
    async fn refresh_without_access_token_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "x" })))
            .mount(&server)
            .await;

        let err = client_for(&server).refresh("refresh-1").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));
    }

    #[test]
    fn into_credentials_keeps_previous_refresh_token() {
        let creds = RefreshResponse::new("access-2").into_credentials("refresh-1");
        assert_eq!(creds.access_token, "access-2");
        assert_eq!(creds.refresh_token.as_deref(), Some("refresh-1"));
        assert!(creds.expires_at.is_none());
    }

    #[test]
    fn into_credentials_applies_expiry() {
        let response = RefreshResponse {
            access_token: "access-2".into(),
            refresh_token: Some("refresh-2".into()),
            expires_in: Some(60),
        };
        let creds = response.into_credentials("refresh-1");
        assert_eq!(creds.refresh_token.as_deref(), Some("refresh-2"));
        assert!(creds.expires_within(std::time::Duration::from_secs(120)));
    }
}
