//! SDK error types

use monay_auth::AuthError;
use monay_types::FailureKind;
use thiserror::Error;

/// Result type for pipeline calls
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Result type for client construction
pub type SdkResult<T> = std::result::Result<T, SdkError>;

/// Failures of one logical call through the request pipeline
///
/// Only authorization failures are recovered inside the pipeline; everything
/// here reaches the caller after at most one refresh-and-retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Credentials could not be refreshed, or the retry was rejected again.
    /// The session has been terminated.
    #[error("Unauthenticated: {reason}")]
    Unauthenticated { reason: String },

    /// The rail call exceeded its deadline
    #[error("Request timed out")]
    Timeout,

    /// The rail could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The rail answered with a 5xx
    #[error("Server error: HTTP {status}")]
    Server { status: u16, body: String },

    /// The rail answered with a body that is not JSON
    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    /// A transient refresh failure; the stored credentials are unchanged
    #[error("Token refresh failed: {0}")]
    Refresh(AuthError),
}

impl PipelineError {
    /// Map onto the failure taxonomy carried by `PaymentResult`
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Unauthenticated { .. } => FailureKind::Unauthenticated,
            Self::Timeout | Self::Refresh(AuthError::RefreshTimeout) => FailureKind::Timeout,
            Self::Transport(_) | Self::Server { .. } | Self::Refresh(_) => FailureKind::Transport,
            Self::MalformedBody(_) => FailureKind::MalformedResponse,
        }
    }

    /// Human-readable reason recorded on a failed `PaymentResult`
    pub fn failure_reason(&self) -> String {
        match self.failure_kind() {
            FailureKind::Timeout => "timeout".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Errors building a [`Monay`](crate::Monay) client
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}
