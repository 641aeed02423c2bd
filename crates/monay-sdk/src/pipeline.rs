//! Authenticated request pipeline
//!
//! Every outbound rail call goes through [`RequestPipeline::execute`]:
//!
//! 1. Refresh first if the stored access token is about to expire
//! 2. Attach `Authorization: Bearer` and a fresh `X-Request-ID`
//! 3. On a 401, refresh through the `RefreshCoordinator` and re-issue the
//!    same request exactly once
//! 4. A second 401, or a refresh that needs a new sign-in, terminates the
//!    session
//!
//! Network failures, 5xx and malformed bodies are returned without retry.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use monay_auth::{AuthError, RefreshCoordinator, SessionEvents, TokenStore};
use monay_types::{HttpMethod, RailResponse, RequestId, RequestSpec};

use crate::error::{PipelineError, PipelineResult};

const UNAUTHORIZED: u16 = 401;

/// Anything that can carry a `RequestSpec` to a rail
#[async_trait]
pub trait RailTransport: Send + Sync {
    /// Issue the request and return the rail's answer
    ///
    /// Any non-5xx status other than 401 is a response, not an error.
    async fn execute(&self, spec: &RequestSpec) -> PipelineResult<RailResponse>;
}

/// Where a logical call is in its authorization retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    AfterRefresh,
}

impl Attempt {
    fn number(&self) -> u8 {
        match self {
            Self::First => 1,
            Self::AfterRefresh => 2,
        }
    }
}

/// What came back from one HTTP round trip
enum Sent {
    Unauthorized,
    Response(RailResponse),
}

/// reqwest-backed pipeline with single-retry token refresh
#[derive(Debug, Clone)]
pub struct RequestPipeline {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    expiry_skew: Duration,
    coordinator: RefreshCoordinator,
    session: SessionEvents,
}

impl RequestPipeline {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        timeout: Duration,
        coordinator: RefreshCoordinator,
        session: SessionEvents,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            timeout,
            expiry_skew: Duration::ZERO,
            coordinator,
            session,
        }
    }

    /// Refresh ahead of time when credentials expire within `skew`
    pub fn with_expiry_skew(mut self, skew: Duration) -> Self {
        self.expiry_skew = skew;
        self
    }

    pub fn store(&self) -> &TokenStore {
        self.coordinator.store()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn refresh_if_expiring(&self) -> PipelineResult<()> {
        let credentials = match self.store().get() {
            Some(c) if c.refresh_token.is_some() && c.expires_within(self.expiry_skew) => c,
            _ => return Ok(()),
        };

        debug!("Access token expiring, refreshing before dispatch");
        match self.coordinator.refresh_stale(Some(&credentials.access_token)).await {
            Ok(_) => Ok(()),
            Err(err) if err.requires_reauthentication() => Err(self.terminate(&err)),
            Err(err) => {
                // The current token may still be accepted
                warn!(error = %err, "Proactive refresh failed, dispatching with current token");
                Ok(())
            }
        }
    }

    async fn send(&self, spec: &RequestSpec, token: Option<&str>, attempt: Attempt) -> PipelineResult<Sent> {
        let url = format!("{}{}", self.endpoint, spec.path);
        let request_id = RequestId::new();

        let mut request = match spec.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        request = request.header("X-Request-ID", request_id.to_string());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        debug!(request_id = %request_id, attempt = attempt.number(), "Sending rail request");

        let timeout = spec.timeout.unwrap_or(self.timeout);
        match tokio::time::timeout(timeout, read_response(request)).await {
            Ok(sent) => sent,
            Err(_) => {
                warn!(request_id = %request_id, timeout = ?timeout, "Rail request timed out");
                Err(PipelineError::Timeout)
            }
        }
    }

    /// Signal termination after a refresh that needs a new sign-in; the
    /// coordinator has already cleared the store
    fn terminate(&self, err: &AuthError) -> PipelineError {
        let reason = err.to_string();
        self.session.terminate(reason.clone());
        PipelineError::Unauthenticated { reason }
    }
}

async fn read_response(request: reqwest::RequestBuilder) -> PipelineResult<Sent> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();

    if status.as_u16() == UNAUTHORIZED {
        return Ok(Sent::Unauthorized);
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    if status.is_server_error() {
        return Err(PipelineError::Server {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).map_err(|e| PipelineError::MalformedBody(e.to_string()))?
    };

    Ok(Sent::Response(RailResponse::new(status.as_u16(), body)))
}

fn transport_error(err: reqwest::Error) -> PipelineError {
    if err.is_timeout() {
        PipelineError::Timeout
    } else {
        PipelineError::Transport(err.to_string())
    }
}

#[async_trait]
impl RailTransport for RequestPipeline {
    #[instrument(skip(self, spec), fields(method = %spec.method, path = %spec.path))]
    async fn execute(&self, spec: &RequestSpec) -> PipelineResult<RailResponse> {
        self.refresh_if_expiring().await?;

        let mut attempt = Attempt::First;
        loop {
            let token = self.store().access_token();
            match self.send(spec, token.as_deref(), attempt).await? {
                Sent::Response(response) => return Ok(response),
                Sent::Unauthorized if attempt == Attempt::First => {
                    warn!("Rail rejected access token, refreshing");
                    match self.coordinator.refresh_stale(token.as_deref()).await {
                        Ok(_) => attempt = Attempt::AfterRefresh,
                        Err(err) if err.requires_reauthentication() => return Err(self.terminate(&err)),
                        Err(err) => return Err(PipelineError::Refresh(err)),
                    }
                }
                Sent::Unauthorized => {
                    let reason = "access token rejected after refresh".to_string();
                    warn!("Refreshed access token rejected, clearing credentials");
                    self.coordinator.invalidate();
                    self.session.terminate(reason.clone());
                    return Err(PipelineError::Unauthenticated { reason });
                }
            }
        }
    }
}
