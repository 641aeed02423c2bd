//! Monay Rails - Unified payment rail abstraction
//!
//! This crate maps one normalized `PaymentIntent` onto heterogeneous external
//! payment rails and maps their divergent answers back:
//!
//! ## Rails
//! - Card processor (Stripe-style charge / payout, card and ACH)
//! - Stablecoin (Circle-style mint / burn)
//! - Instant payments (FedNow / RTP transfers)
//!
//! ## Key Design Principles
//!
//! 1. Adapters are stateless mapping logic: no I/O, no retries
//! 2. Every rail status lands in `Completed | Pending | Failed`
//! 3. Unknown statuses are `Failed`, never `Completed`
//! 4. Rail selection goes through one explicit dispatch table

pub mod adapter;
pub mod adapters;
pub mod envelope;
pub mod registry;

pub use adapter::*;
pub use adapters::*;
pub use envelope::*;
pub use registry::*;
