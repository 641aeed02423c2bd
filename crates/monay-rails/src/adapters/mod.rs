//! Rail adapter implementations

mod card;
mod instant;
mod stablecoin;

pub use card::CardProcessorAdapter;
pub use instant::{InstantNetwork, InstantPaymentAdapter};
pub use stablecoin::StablecoinAdapter;
