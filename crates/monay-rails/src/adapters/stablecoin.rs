//! Stablecoin rail (Circle-style mint / burn)

use serde_json::json;

use monay_types::{
    Currency, PaymentIntent, PaymentResult, PaymentStatus, RailKind, RailResponse, RequestSpec,
    TransferDirection,
};

use crate::adapter::{RailAdapter, RailLimits};
use crate::envelope::normalize_envelope;

const CURRENCIES: &[Currency] = &[Currency::USDC, Currency::USDT, Currency::EURC];

/// One micro-unit up to 1,000 whole tokens
const DEFAULT_LIMITS: RailLimits = RailLimits::new(1, 1_000_000_000);

/// Mints (deposits) and burns (withdrawals) stablecoins
#[derive(Debug, Clone)]
pub struct StablecoinAdapter {
    limits: RailLimits,
    chain: String,
}

impl StablecoinAdapter {
    pub fn new() -> Self {
        Self {
            limits: DEFAULT_LIMITS,
            chain: "ETH".to_string(),
        }
    }

    /// Settle on a different chain
    pub fn on_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = chain.into();
        self
    }

    pub fn with_limits(mut self, limits: RailLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for StablecoinAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(status: &str) -> Option<PaymentStatus> {
    match status {
        "complete" | "completed" | "confirmed" => Some(PaymentStatus::Completed),
        "pending" | "queued" | "running" => Some(PaymentStatus::Pending),
        "failed" => Some(PaymentStatus::Failed),
        _ => None,
    }
}

impl RailAdapter for StablecoinAdapter {
    fn kind(&self) -> RailKind {
        RailKind::Stablecoin
    }

    fn name(&self) -> &'static str {
        "Stablecoin"
    }

    fn currencies(&self) -> &[Currency] {
        CURRENCIES
    }

    fn limits(&self) -> RailLimits {
        self.limits
    }

    fn translate(&self, intent: &PaymentIntent) -> RequestSpec {
        let path = match intent.direction {
            TransferDirection::Deposit => "/api/circle/mint",
            TransferDirection::Withdrawal => "/api/circle/burn",
        };

        RequestSpec::post(
            path,
            json!({
                "idempotencyKey": intent.idempotency_key,
                "amount": intent.amount_minor_units,
                "currency": intent.currency.code(),
                "chain": self.chain,
                "sourceWallet": intent.source_ref,
                "destinationWallet": intent.destination_ref,
                "metadata": intent.metadata,
            }),
        )
    }

    fn normalize(&self, intent: &PaymentIntent, response: &RailResponse) -> PaymentResult {
        normalize_envelope(intent, self.kind(), response, classify)
    }
}
