//! Currency types for Monay
//!
//! Fiat currencies settle over the card and instant-payment rails, stablecoins
//! over the stablecoin rail. Amounts are always carried in minor units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies the rail client can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    /// USD Coin
    USDC,
    /// Tether
    USDT,
    /// Euro Coin
    EURC,
}

impl Currency {
    /// Get the number of minor units per major unit exponent
    pub fn decimals(&self) -> u8 {
        match self {
            Self::USDC | Self::USDT | Self::EURC => 6,
            _ => 2,
        }
    }

    /// Get the ISO 4217 code or token symbol
    pub fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::USDC => "USDC",
            Self::USDT => "USDT",
            Self::EURC => "EURC",
        }
    }

    /// Check if this is an on-chain stablecoin
    pub fn is_stablecoin(&self) -> bool {
        matches!(self, Self::USDC | Self::USDT | Self::EURC)
    }

    /// Check if this is a fiat currency
    pub fn is_fiat(&self) -> bool {
        !self.is_stablecoin()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error returned when parsing an unknown currency code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            "USDC" => Ok(Self::USDC),
            "USDT" => Ok(Self::USDT),
            "EURC" => Ok(Self::EURC),
            other => Err(UnknownCurrency(other.to_string())),
        }
    }
}
