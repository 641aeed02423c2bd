//! Authentication configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token refresh configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path of the refresh endpoint, relative to the API endpoint
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Deadline for one refresh round trip; waiters are released with a
    /// timeout error when it elapses
    #[serde(default = "default_refresh_timeout", with = "humantime_serde")]
    pub refresh_timeout: Duration,
    /// Credentials expiring within this window are refreshed before use
    #[serde(default = "default_expiry_skew", with = "humantime_serde")]
    pub expiry_skew: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_path: default_refresh_path(),
            refresh_timeout: default_refresh_timeout(),
            expiry_skew: default_expiry_skew(),
        }
    }
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_refresh_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_expiry_skew() -> Duration {
    Duration::from_secs(30)
}
