//! Identity types for Monay
//!
//! Idempotency keys are caller-visible strings; request ids are random UUIDs
//! minted once per outbound HTTP attempt.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Identifier of one logical payment attempt
///
/// Every submission carrying the same key has at most one effective
/// execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Wrap a caller-supplied key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive a key deterministically from the payment's identifying fields
    ///
    /// The same `(source, destination, amount, nonce)` tuple always yields the
    /// same key.
    pub fn derive(source_ref: &str, destination_ref: &str, amount_minor_units: i64, nonce: &str) -> Self {
        let amount = amount_minor_units.to_string();
        let mut hasher = Sha256::new();
        for part in [source_ref, destination_ref, amount.as_str(), nonce] {
            hasher.update(part.as_bytes());
            hasher.update([0x1f]);
        }
        let digest = hasher.finalize();
        Self(format!("idem_{}", hex::encode(&digest[..16])))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdempotencyKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for IdempotencyKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Correlation id attached to each outbound HTTP attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create a new random request id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req_{}", self.0.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_key_is_deterministic() {
        let a = IdempotencyKey::derive("wallet_1", "bank_9", 5000, "n1");
        let b = IdempotencyKey::derive("wallet_1", "bank_9", 5000, "n1");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("idem_"));
    }

    #[test]
    fn test_derived_key_depends_on_every_field() {
        let base = IdempotencyKey::derive("wallet_1", "bank_9", 5000, "n1");
        assert_ne!(base, IdempotencyKey::derive("wallet_2", "bank_9", 5000, "n1"));
        assert_ne!(base, IdempotencyKey::derive("wallet_1", "bank_8", 5000, "n1"));
        assert_ne!(base, IdempotencyKey::derive("wallet_1", "bank_9", 5001, "n1"));
        assert_ne!(base, IdempotencyKey::derive("wallet_1", "bank_9", 5000, "n2"));
    }

    #[test]
    fn test_field_boundaries_do_not_collide() {
        let a = IdempotencyKey::derive("ab", "c", 1, "n");
        let b = IdempotencyKey::derive("a", "bc", 1, "n");
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        assert!(id.to_string().starts_with("req_"));
    }
}
