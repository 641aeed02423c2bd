//! Rail adapter trait

use monay_types::{Currency, PaymentIntent, PaymentResult, RailKind, RailResponse, RequestSpec};

/// Per-transaction amount limits, in minor units, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RailLimits {
    pub min_minor_units: i64,
    pub max_minor_units: i64,
}

impl RailLimits {
    pub const fn new(min_minor_units: i64, max_minor_units: i64) -> Self {
        Self {
            min_minor_units,
            max_minor_units,
        }
    }

    pub fn contains(&self, amount_minor_units: i64) -> bool {
        (self.min_minor_units..=self.max_minor_units).contains(&amount_minor_units)
    }
}

/// Mapping between normalized intents/results and one rail's wire shapes
pub trait RailAdapter: Send + Sync {
    /// Get the rail kind this adapter serves
    fn kind(&self) -> RailKind;

    /// Get the human-readable rail name
    fn name(&self) -> &'static str;

    /// Currencies this rail can move
    fn currencies(&self) -> &[Currency];

    /// Per-transaction amount limits
    fn limits(&self) -> RailLimits;

    /// Whether this rail can carry the intent
    fn supports(&self, intent: &PaymentIntent) -> bool {
        self.currencies().contains(&intent.currency) && self.limits().contains(intent.amount_minor_units)
    }

    /// Build the rail-specific request for an intent
    fn translate(&self, intent: &PaymentIntent) -> RequestSpec;

    /// Interpret the rail's response for an intent
    fn normalize(&self, intent: &PaymentIntent, response: &RailResponse) -> PaymentResult;
}
