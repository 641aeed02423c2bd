//! Monay Types - Canonical types for the unified payment-rail client
//!
//! This crate contains the foundational types shared by every other monay
//! crate, with zero dependencies on them. It defines:
//!
//! - Currency and rail identifiers
//! - Idempotency keys
//! - Payment intents and normalized payment results
//! - The transport-neutral request/response shapes rail adapters produce
//!   and consume
//! - Hard dispatch errors
//!
//! # Payment Flow
//!
//! ```text
//! PaymentIntent → RailAdapter::translate → RequestSpec → (HTTP) → RailResponse
//!               → RailAdapter::normalize → PaymentResult (+ BalanceDelta)
//! ```

pub mod currency;
pub mod identity;
pub mod intent;
pub mod result;
pub mod request;
pub mod error;

pub use currency::*;
pub use identity::*;
pub use intent::*;
pub use result::*;
pub use request::*;
pub use error::*;
