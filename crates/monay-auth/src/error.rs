//! Authentication error types
//!
//! A single refresh outcome is handed to every waiter, so `AuthError` is
//! `Clone` and carries only strings and status codes.

use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No refresh token is stored; the user must sign in again
    #[error("No refresh token available, re-authentication required")]
    NoRefreshToken,

    /// The refresh endpoint refused the refresh token
    #[error("Token refresh rejected with status {status}: {message}")]
    RefreshRejected { status: u16, message: String },

    /// The refresh endpoint answered with something other than a token pair
    #[error("Malformed refresh response: {0}")]
    MalformedResponse(String),

    /// The refresh round trip exceeded its deadline
    #[error("Token refresh timed out")]
    RefreshTimeout,

    /// The refresh endpoint could not be reached
    #[error("Token refresh transport error: {0}")]
    Transport(String),
}

impl AuthError {
    /// Whether the session is unrecoverable without a fresh sign-in
    ///
    /// Timeouts and transport failures leave the stored credentials in place.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::NoRefreshToken | Self::RefreshRejected { .. } | Self::MalformedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reauthentication_classes() {
        assert!(AuthError::NoRefreshToken.requires_reauthentication());
        assert!(AuthError::RefreshRejected {
            status: 401,
            message: "expired".into()
        }
        .requires_reauthentication());
        assert!(AuthError::MalformedResponse("no accessToken".into()).requires_reauthentication());
        assert!(!AuthError::RefreshTimeout.requires_reauthentication());
        assert!(!AuthError::Transport("connection refused".into()).requires_reauthentication());
    }
}
