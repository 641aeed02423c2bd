//! Card / ACH processor rail (Stripe-style)

use serde_json::json;

use monay_types::{
    Currency, PaymentIntent, PaymentResult, PaymentStatus, RailKind, RailResponse, RequestSpec,
    TransferDirection,
};

use crate::adapter::{RailAdapter, RailLimits};
use crate::envelope::normalize_envelope;

const CURRENCIES: &[Currency] = &[Currency::USD, Currency::EUR, Currency::GBP, Currency::CAD, Currency::AUD];

/// $1.00 to $10,000.00 per charge
const DEFAULT_LIMITS: RailLimits = RailLimits::new(100, 1_000_000);

/// Charges (deposits) and payouts (withdrawals) through the card processor
#[derive(Debug, Clone)]
pub struct CardProcessorAdapter {
    limits: RailLimits,
}

impl CardProcessorAdapter {
    pub fn new() -> Self {
        Self {
            limits: DEFAULT_LIMITS,
        }
    }

    pub fn with_limits(mut self, limits: RailLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for CardProcessorAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(status: &str) -> Option<PaymentStatus> {
    match status {
        "succeeded" | "paid" | "completed" => Some(PaymentStatus::Completed),
        "pending" | "processing" | "in_transit" | "requires_capture" => Some(PaymentStatus::Pending),
        "failed" | "canceled" | "cancelled" | "declined" | "requires_payment_method" => {
            Some(PaymentStatus::Failed)
        }
        _ => None,
    }
}

impl RailAdapter for CardProcessorAdapter {
    fn kind(&self) -> RailKind {
        RailKind::CardProcessor
    }

    fn name(&self) -> &'static str {
        "Card Processor"
    }

    fn currencies(&self) -> &[Currency] {
        CURRENCIES
    }

    fn limits(&self) -> RailLimits {
        self.limits
    }

    fn translate(&self, intent: &PaymentIntent) -> RequestSpec {
        let path = match intent.direction {
            TransferDirection::Deposit => "/api/stripe/charge",
            TransferDirection::Withdrawal => "/api/stripe/payout",
        };

        RequestSpec::post(
            path,
            json!({
                "amount": intent.amount_minor_units,
                "currency": intent.currency.code().to_lowercase(),
                "source": intent.source_ref,
                "destination": intent.destination_ref,
                "type": intent.direction.to_string(),
                "idempotencyKey": intent.idempotency_key,
                "metadata": intent.metadata,
            }),
        )
    }

    fn normalize(&self, intent: &PaymentIntent, response: &RailResponse) -> PaymentResult {
        normalize_envelope(intent, self.kind(), response, classify)
    }
}
