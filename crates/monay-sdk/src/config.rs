//! Client configuration

use monay_auth::AuthConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Monay client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL every rail path and the refresh path are joined onto
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Deadline for one rail round trip, unless the request overrides it
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Buffered balance events per subscriber before it starts lagging
    #[serde(default = "default_balance_channel_capacity")]
    pub balance_channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout: default_request_timeout(),
            auth: AuthConfig::default(),
            balance_channel_capacity: default_balance_channel_capacity(),
        }
    }
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Reads `.env` if present, then:
    /// - `MONAY_API_URL`: API endpoint
    /// - `MONAY_REQUEST_TIMEOUT_SECS`: rail call deadline
    /// - `MONAY_REFRESH_TIMEOUT_SECS`: token refresh deadline
    pub fn from_env() -> Self {
        // Try to load .env file (ignore errors)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("MONAY_API_URL").filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(timeout) = seconds(&lookup, "MONAY_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = timeout;
        }
        if let Some(timeout) = seconds(&lookup, "MONAY_REFRESH_TIMEOUT_SECS") {
            config.auth.refresh_timeout = timeout;
        }

        config
    }
}

fn seconds(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<Duration> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            tracing::warn!(variable = name, value = %raw, "Ignoring invalid timeout, using default");
            None
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:3001".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_balance_channel_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://localhost:3001");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.auth, AuthConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("MONAY_API_URL", "https://api.monay.test"),
            ("MONAY_REQUEST_TIMEOUT_SECS", "5"),
            ("MONAY_REFRESH_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(config.endpoint, "https://api.monay.test");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.auth.refresh_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("MONAY_REQUEST_TIMEOUT_SECS", "soon"),
            ("MONAY_REFRESH_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_deserialize_with_humantime() {
        let config: Config = serde_json::from_str(
            r#"{"endpoint": "http://rails.local", "request_timeout": "750ms", "auth": {"expiry_skew": "1m"}}"#,
        )
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_millis(750));
        assert_eq!(config.auth.expiry_skew, Duration::from_secs(60));
        assert_eq!(config.balance_channel_capacity, 64);
    }
}
