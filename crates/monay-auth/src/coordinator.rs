//! Single-flight token refresh
//!
//! At most one refresh round trip is outstanding at any time. The first
//! caller becomes the leader and drives the refresh; every caller that
//! arrives before it settles awaits the same shared future and receives the
//! same `Credentials` or the same `AuthError`.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{AuthError, AuthResult};
use crate::refresh::RefreshClient;
use crate::store::{Credentials, TokenStore};

type RefreshFlight = Shared<BoxFuture<'static, AuthResult<Credentials>>>;

/// Coordinates token refreshes for one `TokenStore`
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    store: TokenStore,
    client: Arc<dyn RefreshClient>,
    timeout: Duration,
    in_flight: Mutex<Option<RefreshFlight>>,
}

impl RefreshCoordinator {
    /// Create a coordinator that refreshes `store` through `client`
    pub fn new(store: TokenStore, client: Arc<dyn RefreshClient>, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                client,
                timeout,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Get the token store this coordinator mutates
    pub fn store(&self) -> &TokenStore {
        &self.inner.store
    }

    /// Whether a refresh is currently outstanding
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.lock().is_some()
    }

    /// Install credentials from a sign-in
    pub fn install(&self, credentials: Credentials) {
        debug!(expires_at = ?credentials.expires_at, "Installing credentials");
        self.inner.store.set(credentials);
    }

    /// Drop the credentials; the next call needs a full sign-in
    pub fn invalidate(&self) {
        info!("Clearing credentials");
        self.inner.store.clear();
    }

    /// Refresh the credentials, joining any refresh already in flight
    pub async fn refresh(&self) -> AuthResult<Credentials> {
        self.refresh_stale(None).await
    }

    /// Refresh after `stale_access_token` was rejected
    ///
    /// If the stored access token has already moved on from the rejected one,
    /// the current credentials are returned without a network call.
    pub async fn refresh_stale(&self, stale_access_token: Option<&str>) -> AuthResult<Credentials> {
        let flight = {
            let mut slot = self.inner.in_flight.lock();
            match slot.as_ref() {
                Some(flight) => {
                    debug!("Joining in-flight token refresh");
                    flight.clone()
                }
                None => {
                    if let (Some(stale), Some(current)) = (stale_access_token, self.inner.store.get()) {
                        if current.access_token != stale {
                            debug!("Access token already rotated, reusing it");
                            return Ok(current);
                        }
                    }

                    let flight = lead(self.inner.clone()).boxed().shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        flight.await
    }
}

impl fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("store", &self.inner.store)
            .field("timeout", &self.inner.timeout)
            .field("refreshing", &self.is_refreshing())
            .finish()
    }
}

/// Leader body: run the refresh, then vacate the slot for the next one
async fn lead(inner: Arc<Inner>) -> AuthResult<Credentials> {
    let outcome = inner.run().await;
    inner.in_flight.lock().take();
    outcome
}

impl Inner {
    async fn run(&self) -> AuthResult<Credentials> {
        let refresh_token = match self.store.get().and_then(|c| c.refresh_token) {
            Some(token) if !token.is_empty() => token,
            _ => {
                warn!("No refresh token stored, clearing credentials");
                self.store.clear();
                return Err(AuthError::NoRefreshToken);
            }
        };

        info!("Refreshing access token");
        let outcome = match tokio::time::timeout(self.timeout, self.client.refresh(&refresh_token)).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::RefreshTimeout),
        };

        match outcome {
            Ok(response) => {
                let credentials = response.into_credentials(&refresh_token);
                self.store.set(credentials.clone());
                info!(expires_at = ?credentials.expires_at, "Access token refreshed");
                Ok(credentials)
            }
            Err(err) if err.requires_reauthentication() => {
                warn!(error = %err, "Token refresh failed, clearing credentials");
                self.store.clear();
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed, keeping credentials");
                Err(err)
            }
        }
    }
}
