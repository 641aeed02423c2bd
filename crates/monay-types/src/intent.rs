//! Payment intents
//!
//! A `PaymentIntent` is the normalized, rail-agnostic description of one
//! "move money" request. It is created by the caller per payment attempt and
//! never mutated once submitted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::currency::Currency;
use crate::identity::IdempotencyKey;

/// External payment rail families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RailKind {
    /// Card / ACH processor (Stripe-style charge and payout)
    #[serde(rename = "card")]
    CardProcessor,
    /// Stablecoin mint and burn (Circle-style)
    #[serde(rename = "stablecoin")]
    Stablecoin,
    /// Instant payments over FedNow / RTP
    #[serde(rename = "instant")]
    InstantPayment,
}

impl RailKind {
    /// All rail kinds, in default priority order
    pub const ALL: [RailKind; 3] = [Self::CardProcessor, Self::InstantPayment, Self::Stablecoin];

    /// Short name used in hints, logs and the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardProcessor => "card",
            Self::Stablecoin => "stablecoin",
            Self::InstantPayment => "instant",
        }
    }
}

impl fmt::Display for RailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown rail name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown rail: {0}")]
pub struct UnknownRail(pub String);

impl FromStr for RailKind {
    type Err = UnknownRail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" | "card_processor" | "ach" | "stripe" => Ok(Self::CardProcessor),
            "stablecoin" | "crypto" | "circle" | "usdc" => Ok(Self::Stablecoin),
            "instant" | "instant_payment" | "fednow" | "rtp" | "dwolla" => Ok(Self::InstantPayment),
            other => Err(UnknownRail(other.to_string())),
        }
    }
}

/// Which way money moves relative to the caller's wallet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    /// On-ramp: funds enter the wallet
    #[default]
    Deposit,
    /// Off-ramp: funds leave the wallet
    Withdrawal,
}

impl TransferDirection {
    /// Sign applied to a completed amount when computing the balance delta
    pub fn sign(&self) -> i64 {
        match self {
            Self::Deposit => 1,
            Self::Withdrawal => -1,
        }
    }
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => f.write_str("deposit"),
            Self::Withdrawal => f.write_str("withdrawal"),
        }
    }
}

impl FromStr for TransferDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deposit" | "add-money" | "onramp" => Ok(Self::Deposit),
            "withdrawal" | "withdraw" | "offramp" => Ok(Self::Withdrawal),
            other => Err(format!("Unknown transfer direction: {}", other)),
        }
    }
}

/// A normalized request to move money over some rail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub idempotency_key: IdempotencyKey,
    /// Preferred rail; `None` lets the dispatcher choose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rail_hint: Option<RailKind>,
    pub amount_minor_units: i64,
    pub currency: Currency,
    #[serde(default)]
    pub direction: TransferDirection,
    pub source_ref: String,
    pub destination_ref: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl PaymentIntent {
    /// Start building an intent
    pub fn builder(
        source_ref: impl Into<String>,
        destination_ref: impl Into<String>,
        amount_minor_units: i64,
        currency: Currency,
    ) -> PaymentIntentBuilder {
        PaymentIntentBuilder {
            source_ref: source_ref.into(),
            destination_ref: destination_ref.into(),
            amount_minor_units,
            currency,
            rail_hint: None,
            direction: TransferDirection::default(),
            idempotency_key: None,
            nonce: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Signed amount this intent moves when it completes
    pub fn signed_amount(&self) -> i64 {
        self.amount_minor_units * self.direction.sign()
    }
}

/// Builder for [`PaymentIntent`]
#[derive(Debug, Clone)]
pub struct PaymentIntentBuilder {
    source_ref: String,
    destination_ref: String,
    amount_minor_units: i64,
    currency: Currency,
    rail_hint: Option<RailKind>,
    direction: TransferDirection,
    idempotency_key: Option<IdempotencyKey>,
    nonce: Option<String>,
    metadata: BTreeMap<String, String>,
}

impl PaymentIntentBuilder {
    /// Prefer a specific rail
    pub fn rail(mut self, rail: RailKind) -> Self {
        self.rail_hint = Some(rail);
        self
    }

    /// Set the transfer direction
    pub fn direction(mut self, direction: TransferDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Use a caller-supplied idempotency key
    pub fn idempotency_key(mut self, key: impl Into<IdempotencyKey>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Set the nonce used when deriving the idempotency key
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Attach a metadata entry forwarded to the rail
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> PaymentIntent {
        let idempotency_key = match self.idempotency_key {
            Some(key) => key,
            None => {
                let nonce = self
                    .nonce
                    .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
                IdempotencyKey::derive(
                    &self.source_ref,
                    &self.destination_ref,
                    self.amount_minor_units,
                    &nonce,
                )
            }
        };

        PaymentIntent {
            idempotency_key,
            rail_hint: self.rail_hint,
            amount_minor_units: self.amount_minor_units,
            currency: self.currency,
            direction: self.direction,
            source_ref: self.source_ref,
            destination_ref: self.destination_ref,
            metadata: self.metadata,
        }
    }
}
