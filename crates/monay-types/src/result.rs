//! Normalized payment results
//!
//! Every rail's response, and every transport failure on the way to it, ends
//! up as exactly one `PaymentResult` per submitted intent.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;
use crate::identity::IdempotencyKey;
use crate::intent::{PaymentIntent, RailKind};

/// Three-way outcome of a dispatched intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Completed,
    /// Accepted by the rail but not yet settled; terminal for the dispatcher
    Pending,
    Failed,
}

impl PaymentStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Pending => f.write_str("pending"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Why a result is `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Session could not be re-authenticated
    Unauthenticated,
    /// Network failure or 5xx from the rail
    Transport,
    /// Rail call exceeded its deadline
    Timeout,
    /// Rail explicitly declined the payment
    Rejected,
    /// Rail reported a status this client does not know
    UnrecognizedStatus,
    /// Rail response could not be interpreted
    MalformedResponse,
}

impl FailureKind {
    /// Failures where the rail may never have seen the request.
    ///
    /// Resubmitting with the same idempotency key is safe for these.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport | Self::Timeout | Self::Unauthenticated)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Rejected => "rejected",
            Self::UnrecognizedStatus => "unrecognized_status",
            Self::MalformedResponse => "malformed_response",
        };
        f.write_str(s)
    }
}

/// Normalized result of one submitted intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub idempotency_key: IdempotencyKey,
    pub rail: RailKind,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rail_transaction_id: Option<String>,
    /// Amount the rail reports having moved, in minor units
    pub normalized_amount: i64,
    pub currency: Currency,
    /// Signed change to the wallet balance; zero unless `Completed`
    pub balance_delta: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl PaymentResult {
    /// Result for a rail-confirmed, settled payment
    pub fn completed(
        intent: &PaymentIntent,
        rail: RailKind,
        transaction_id: impl Into<String>,
        normalized_amount: i64,
    ) -> Self {
        let transaction_id = transaction_id.into();
        let balance_delta = match normalized_amount.checked_mul(intent.direction.sign()) {
            Some(delta) => delta,
            None => {
                return Self::failed(
                    intent,
                    rail,
                    FailureKind::MalformedResponse,
                    format!("{} reported an out-of-range amount {}", rail, normalized_amount),
                )
                .with_transaction_id(Some(transaction_id))
            }
        };
        Self {
            idempotency_key: intent.idempotency_key.clone(),
            rail,
            status: PaymentStatus::Completed,
            rail_transaction_id: Some(transaction_id),
            normalized_amount,
            currency: intent.currency,
            balance_delta,
            failure_kind: None,
            failure_reason: None,
        }
    }

    /// Result for a payment the rail accepted but has not settled
    pub fn pending(
        intent: &PaymentIntent,
        rail: RailKind,
        transaction_id: impl Into<String>,
        normalized_amount: i64,
    ) -> Self {
        Self {
            idempotency_key: intent.idempotency_key.clone(),
            rail,
            status: PaymentStatus::Pending,
            rail_transaction_id: Some(transaction_id.into()),
            normalized_amount,
            currency: intent.currency,
            balance_delta: 0,
            failure_kind: None,
            failure_reason: None,
        }
    }

    /// Result for a failed payment
    pub fn failed(
        intent: &PaymentIntent,
        rail: RailKind,
        kind: FailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            idempotency_key: intent.idempotency_key.clone(),
            rail,
            status: PaymentStatus::Failed,
            rail_transaction_id: None,
            normalized_amount: intent.amount_minor_units,
            currency: intent.currency,
            balance_delta: 0,
            failure_kind: Some(kind),
            failure_reason: Some(reason.into()),
        }
    }

    /// Attach the rail's transaction id to a failed result
    pub fn with_transaction_id(mut self, transaction_id: Option<String>) -> Self {
        if transaction_id.is_some() {
            self.rail_transaction_id = transaction_id;
        }
        self
    }

    /// Whether resubmitting the same intent may produce a different outcome
    pub fn is_retryable(&self) -> bool {
        self.failure_kind.map(|k| k.is_retryable()).unwrap_or(false)
    }

    /// Balance event for this result, if it moved money
    pub fn balance_delta_event(&self) -> Option<BalanceDelta> {
        if !self.status.is_completed() {
            return None;
        }
        Some(BalanceDelta {
            idempotency_key: self.idempotency_key.clone(),
            rail: self.rail,
            rail_transaction_id: self.rail_transaction_id.clone(),
            currency: self.currency,
            delta_minor_units: self.balance_delta,
        })
    }
}

/// Signed balance change emitted for a completed payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDelta {
    pub idempotency_key: IdempotencyKey,
    pub rail: RailKind,
    pub rail_transaction_id: Option<String>,
    pub currency: Currency,
    pub delta_minor_units: i64,
}
