//! Monay SDK - unified payment dispatch client
//!
//! One client for every external payment rail Monay talks to. Callers build a
//! [`PaymentIntent`], submit it, and always get back a normalized
//! [`PaymentResult`]:
//!
//! ```ignore
//! use monay_sdk::{Credentials, Currency, Monay, PaymentIntent, RailKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let monay = Monay::builder()
//!         .endpoint("https://api.monay.com")
//!         .credentials(Credentials::new("access", Some("refresh".into())))
//!         .build()?;
//!
//!     let intent = PaymentIntent::builder("wallet_1", "bank_1", 5000, Currency::USD)
//!         .rail(RailKind::InstantPayment)
//!         .nonce("order-1842")
//!         .build();
//!
//!     let result = monay.submit(intent).await?;
//!     println!("{} via {}: {:?}", result.status, result.rail, result.rail_transaction_id);
//!     Ok(())
//! }
//! ```
//!
//! # Guarantees
//!
//! - **Single-flight refresh**: any number of concurrent 401s cause one
//!   refresh round trip
//! - **One retry per call**: a request is re-issued at most once after a
//!   refresh
//! - **Exactly-once per key**: resubmitting an idempotency key returns the
//!   recorded result without a second dispatch
//! - **No silent success**: unknown rail statuses are `Failed`

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod idempotency;
pub mod pipeline;

pub use config::Config;
pub use dispatcher::PaymentDispatcher;
pub use error::{PipelineError, PipelineResult, SdkError, SdkResult};
pub use idempotency::{IdempotencyCache, Origin};
pub use pipeline::{RailTransport, RequestPipeline};

pub use monay_auth::{
    AuthConfig, AuthError, Credentials, HttpRefreshClient, RefreshClient, RefreshCoordinator,
    SessionEvent, SessionEvents, TokenStore,
};
pub use monay_rails::{RailAdapter, RailLimits, RailRegistry};
pub use monay_types::*;

use std::sync::Arc;
use tokio::sync::broadcast;

/// Monay client: auth, pipeline and dispatcher wired together
#[derive(Debug, Clone)]
pub struct Monay {
    config: Config,
    session: SessionEvents,
    coordinator: RefreshCoordinator,
    pipeline: Arc<RequestPipeline>,
    dispatcher: PaymentDispatcher,
}

impl Monay {
    pub fn builder() -> MonayBuilder {
        MonayBuilder::new()
    }

    /// Build a client from `MONAY_*` environment variables
    pub fn from_env() -> SdkResult<Self> {
        Self::builder().config(Config::from_env()).build()
    }

    /// Submit a payment intent
    pub async fn submit(&self, intent: PaymentIntent) -> DispatchResult<PaymentResult> {
        self.dispatcher.submit(intent).await
    }

    /// Install credentials after a sign-in
    pub fn sign_in(&self, credentials: Credentials) {
        self.coordinator.install(credentials);
    }

    /// Drop the credentials
    pub fn sign_out(&self) {
        self.coordinator.invalidate();
    }

    pub fn is_authenticated(&self) -> bool {
        self.coordinator.store().get().is_some()
    }

    pub fn subscribe_session(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    pub fn subscribe_balance(&self) -> broadcast::Receiver<BalanceDelta> {
        self.dispatcher.subscribe_balance()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &TokenStore {
        self.coordinator.store()
    }

    pub fn rails(&self) -> &RailRegistry {
        self.dispatcher.registry()
    }

    /// The authenticated pipeline, for calls outside payment dispatch
    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub fn dispatcher(&self) -> &PaymentDispatcher {
        &self.dispatcher
    }
}

/// Builder for [`Monay`]
#[derive(Default)]
pub struct MonayBuilder {
    config: Config,
    registry: Option<RailRegistry>,
    credentials: Option<Credentials>,
    refresh_client: Option<Arc<dyn RefreshClient>>,
    http_client: Option<reqwest::Client>,
}

impl MonayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Use a custom rail registry instead of [`RailRegistry::standard`]
    pub fn registry(mut self, registry: RailRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Replace the HTTP refresh client
    pub fn refresh_client(mut self, client: Arc<dyn RefreshClient>) -> Self {
        self.refresh_client = Some(client);
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> SdkResult<Monay> {
        let config = self.config;
        let endpoint = config.endpoint.trim().trim_end_matches('/').to_string();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                config.endpoint
            )));
        }

        let http = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(concat!("monay-sdk/", env!("CARGO_PKG_VERSION")))
                .build()?,
        };

        let store = match self.credentials {
            Some(credentials) => TokenStore::with_credentials(credentials),
            None => TokenStore::new(),
        };
        let refresh_client: Arc<dyn RefreshClient> = match self.refresh_client {
            Some(client) => client,
            None => Arc::new(HttpRefreshClient::new(http.clone(), &endpoint, &config.auth)),
        };
        let coordinator = RefreshCoordinator::new(store, refresh_client, config.auth.refresh_timeout);
        let session = SessionEvents::new();

        let pipeline = Arc::new(
            RequestPipeline::new(
                http,
                endpoint.clone(),
                config.request_timeout,
                coordinator.clone(),
                session.clone(),
            )
            .with_expiry_skew(config.auth.expiry_skew),
        );
        let dispatcher = PaymentDispatcher::with_balance_capacity(
            self.registry.unwrap_or_else(RailRegistry::standard),
            pipeline.clone(),
            config.balance_channel_capacity,
        );

        tracing::info!(
            endpoint = %endpoint,
            rails = ?dispatcher.registry().kinds(),
            "Monay client ready"
        );

        Ok(Monay {
            config,
            session,
            coordinator,
            pipeline,
            dispatcher,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let monay = Monay::builder().build().unwrap();
        assert_eq!(monay.config().endpoint, "http://localhost:3001");
        assert_eq!(monay.rails().kinds(), RailRegistry::standard().kinds());
        assert!(!monay.is_authenticated());
    }

    #[test]
    fn test_builder_rejects_non_http_endpoint() {
        let err = Monay::builder().endpoint("ftp://rails").build().unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn test_sign_in_and_out() {
        let monay = Monay::builder().build().unwrap();
        monay.sign_in(Credentials::new("access", None));
        assert_eq!(monay.store().access_token().as_deref(), Some("access"));
        monay.sign_out();
        assert!(!monay.is_authenticated());
    }

    #[test]
    fn test_custom_registry() {
        let registry = RailRegistry::new().with(monay_rails::StablecoinAdapter::new());
        let monay = Monay::builder().registry(registry).build().unwrap();
        assert_eq!(monay.rails().kinds(), vec![RailKind::Stablecoin]);
    }
}
