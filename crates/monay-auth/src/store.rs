//! Token storage
//!
//! `TokenStore` holds the one live credentials pair of the session. Reads and
//! writes go through a single mutex; clones share the same slot.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Access/refresh token pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: None,
        }
    }

    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the access token expires within `skew` of now
    ///
    /// Credentials without a known expiry never count as expiring.
    pub fn expires_within(&self, skew: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let skew = chrono::Duration::from_std(skew).unwrap_or_else(|_| chrono::Duration::zero());
                expires_at <= Utc::now() + skew
            }
            None => false,
        }
    }
}

// Tokens never reach logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Process-wide holder of the current credentials
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<Mutex<Option<Credentials>>>,
}

impl TokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with credentials
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(credentials))),
        }
    }

    /// Get a snapshot of the current credentials
    pub fn get(&self) -> Option<Credentials> {
        self.inner.lock().clone()
    }

    /// Replace the credentials atomically
    pub fn set(&self, credentials: Credentials) {
        *self.inner.lock() = Some(credentials);
    }

    /// Drop the credentials entirely
    pub fn clear(&self) {
        *self.inner.lock() = None;
    }

    /// Current access token, if any
    pub fn access_token(&self) -> Option<String> {
        self.inner.lock().as_ref().map(|c| c.access_token.clone())
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("authenticated", &self.inner.lock().is_some())
            .finish()
    }
}
