//! Monay Authentication Layer
//!
//! Client-side bearer-token management for every outbound Monay call:
//!
//! - **TokenStore**: the one live `Credentials` pair for the session
//! - **RefreshCoordinator**: single-flight token refresh; every caller that
//!   arrives while a refresh is outstanding receives that refresh's outcome
//! - **RefreshClient**: the `POST /auth/refresh` round trip
//! - **SessionEvents**: explicit "session terminated" notifications for the
//!   UI layer to act on
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Refresh Flow                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  401 → RefreshCoordinator ──(leader)──► RefreshClient        │
//! │              │   ▲                          │                │
//! │         (waiters join)                      ▼                │
//! │              │   └──────── outcome ◄── TokenStore.set/clear  │
//! │              ▼                                               │
//! │      Credentials | AuthError ──► SessionEvents (terminal)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod refresh;
pub mod session;
pub mod store;

pub use config::AuthConfig;
pub use coordinator::RefreshCoordinator;
pub use error::{AuthError, AuthResult};
pub use refresh::{HttpRefreshClient, RefreshClient, RefreshResponse};
pub use session::{SessionEvent, SessionEvents};
pub use store::{Credentials, TokenStore};
