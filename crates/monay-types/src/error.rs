//! Hard dispatch errors
//!
//! Only caller bugs and configuration gaps surface as errors. Every payment
//! outcome, including transport failures, is a `PaymentResult` instead.

use thiserror::Error;

use crate::currency::Currency;
use crate::intent::RailKind;

/// Result type for dispatcher operations
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Errors returned by `PaymentDispatcher::submit` instead of a result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The intent itself is malformed; retrying it cannot help
    #[error("Invalid payment intent: {reason}")]
    InvalidIntent { reason: String },

    /// No registered rail can carry this intent
    #[error("No rail available for {currency} (hint: {})", .hint.as_ref().map(RailKind::as_str).unwrap_or("none"))]
    NoRailAvailable {
        currency: Currency,
        hint: Option<RailKind>,
    },
}

impl DispatchError {
    pub fn invalid_intent(reason: impl Into<String>) -> Self {
        Self::InvalidIntent {
            reason: reason.into(),
        }
    }
}
