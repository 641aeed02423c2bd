//! Instant payment rail (FedNow / RTP transfers)

use serde_json::json;

use monay_types::{
    Currency, PaymentIntent, PaymentResult, PaymentStatus, RailKind, RailResponse, RequestSpec,
    TransferDirection,
};

use crate::adapter::{RailAdapter, RailLimits};
use crate::envelope::normalize_envelope;

const CURRENCIES: &[Currency] = &[Currency::USD];

/// $1.00 to $1,000,000.00 per transfer
const DEFAULT_LIMITS: RailLimits = RailLimits::new(100, 100_000_000);

/// Network the transfer clears on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantNetwork {
    FedNow,
    Rtp,
}

impl InstantNetwork {
    fn wire_name(&self) -> &'static str {
        match self {
            Self::FedNow => "FEDNOW",
            Self::Rtp => "RTP",
        }
    }
}

/// Real-time transfers into and out of a bank funding source
#[derive(Debug, Clone)]
pub struct InstantPaymentAdapter {
    limits: RailLimits,
    network: InstantNetwork,
}

impl InstantPaymentAdapter {
    pub fn new() -> Self {
        Self {
            limits: DEFAULT_LIMITS,
            network: InstantNetwork::FedNow,
        }
    }

    pub fn with_network(mut self, network: InstantNetwork) -> Self {
        self.network = network;
        self
    }

    pub fn with_limits(mut self, limits: RailLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for InstantPaymentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(status: &str) -> Option<PaymentStatus> {
    match status {
        "processed" | "completed" | "settled" => Some(PaymentStatus::Completed),
        "pending" | "accepted" => Some(PaymentStatus::Pending),
        "failed" | "cancelled" | "reclaimed" | "rejected" => Some(PaymentStatus::Failed),
        _ => None,
    }
}

impl RailAdapter for InstantPaymentAdapter {
    fn kind(&self) -> RailKind {
        RailKind::InstantPayment
    }

    fn name(&self) -> &'static str {
        "Instant Payments"
    }

    fn currencies(&self) -> &[Currency] {
        CURRENCIES
    }

    fn limits(&self) -> RailLimits {
        self.limits
    }

    fn translate(&self, intent: &PaymentIntent) -> RequestSpec {
        let path = match intent.direction {
            TransferDirection::Deposit => "/api/payment-rails/transfer/deposit",
            TransferDirection::Withdrawal => "/api/payment-rails/transfer/withdraw",
        };

        RequestSpec::post(
            path,
            json!({
                "idempotencyKey": intent.idempotency_key,
                "amount": intent.amount_minor_units,
                "currency": intent.currency.code(),
                "rail": self.network.wire_name(),
                "sourceFundingSource": intent.source_ref,
                "destinationFundingSource": intent.destination_ref,
                "metadata": intent.metadata,
            }),
        )
    }

    fn normalize(&self, intent: &PaymentIntent, response: &RailResponse) -> PaymentResult {
        normalize_envelope(intent, self.kind(), response, classify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monay_types::FailureKind;

    fn intent() -> PaymentIntent {
        PaymentIntent::builder("wallet_1", "bank_1", 5000, Currency::USD)
            .idempotency_key("abc")
            .rail(RailKind::InstantPayment)
            .build()
    }

    #[test]
    fn test_translate_marks_network() {
        let spec = InstantPaymentAdapter::new().translate(&intent());
        assert_eq!(spec.path, "/api/payment-rails/transfer/deposit");
        assert_eq!(spec.body.as_ref().unwrap()["rail"], "FEDNOW");

        let rtp = InstantPaymentAdapter::new()
            .with_network(InstantNetwork::Rtp)
            .translate(&intent());
        assert_eq!(rtp.body.unwrap()["rail"], "RTP");
    }

    #[test]
    fn test_bare_success_envelope_completes() {
        let result = InstantPaymentAdapter::new().normalize(
            &intent(),
            &RailResponse::new(200, json!({ "success": true, "transactionId": "instant_1", "amount": 5000 })),
        );
        assert_eq!(result.status, PaymentStatus::Completed);
        assert_eq!(result.rail_transaction_id.as_deref(), Some("instant_1"));
        assert_eq!(result.normalized_amount, 5000);
        assert_eq!(result.balance_delta, 5000);
    }

    #[test]
    fn test_reclaimed_transfer_fails() {
        let result = InstantPaymentAdapter::new().normalize(
            &intent(),
            &RailResponse::new(200, json!({ "success": true, "transactionId": "instant_2", "status": "reclaimed" })),
        );
        assert_eq!(result.status, PaymentStatus::Failed);
        assert_eq!(result.failure_kind, Some(FailureKind::Rejected));
    }

    #[test]
    fn test_usd_only() {
        let eur = PaymentIntent::builder("a", "b", 5000, Currency::EUR).build();
        assert!(!InstantPaymentAdapter::new().supports(&eur));
        assert!(InstantPaymentAdapter::new().supports(&intent()));
    }
}
