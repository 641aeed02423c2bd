//! Payment dispatcher
//!
//! `submit` is the single entry point for moving money:
//!
//! ```text
//! validate ─► select rail ─► idempotency cache ─┬─ hit ──────────────► result
//!                                               └─ miss ─► translate
//!                                                           ─► pipeline
//!                                                           ─► normalize ─► cache ─► balance event
//! ```
//!
//! Only caller bugs (`InvalidIntent`) and configuration gaps
//! (`NoRailAvailable`) are errors. Every transport or auth failure comes
//! back as a `Failed` result.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use monay_rails::{RailAdapter, RailRegistry};
use monay_types::{
    BalanceDelta, DispatchError, DispatchResult, IdempotencyKey, PaymentIntent, PaymentResult,
};

use crate::idempotency::{IdempotencyCache, Origin};
use crate::pipeline::RailTransport;

const DEFAULT_BALANCE_CAPACITY: usize = 64;

/// Routes payment intents to rails exactly once per idempotency key
#[derive(Clone)]
pub struct PaymentDispatcher {
    registry: RailRegistry,
    transport: Arc<dyn RailTransport>,
    cache: IdempotencyCache,
    balance: broadcast::Sender<BalanceDelta>,
}

impl PaymentDispatcher {
    pub fn new(registry: RailRegistry, transport: Arc<dyn RailTransport>) -> Self {
        Self::with_balance_capacity(registry, transport, DEFAULT_BALANCE_CAPACITY)
    }

    pub fn with_balance_capacity(
        registry: RailRegistry,
        transport: Arc<dyn RailTransport>,
        capacity: usize,
    ) -> Self {
        let (balance, _) = broadcast::channel(capacity.max(1));
        Self {
            registry,
            transport,
            cache: IdempotencyCache::new(),
            balance,
        }
    }

    /// Subscribe to balance deltas of completed payments
    pub fn subscribe_balance(&self) -> broadcast::Receiver<BalanceDelta> {
        self.balance.subscribe()
    }

    pub fn registry(&self) -> &RailRegistry {
        &self.registry
    }

    /// Result already recorded for a key
    pub fn cached(&self, key: &IdempotencyKey) -> Option<PaymentResult> {
        self.cache.get(key)
    }

    /// Submit an intent and wait for its normalized result
    #[instrument(
        skip(self, intent),
        fields(
            idempotency_key = %intent.idempotency_key,
            amount = intent.amount_minor_units,
            currency = %intent.currency,
        )
    )]
    pub async fn submit(&self, intent: PaymentIntent) -> DispatchResult<PaymentResult> {
        validate(&intent)?;
        let adapter = self.registry.select(&intent)?;
        let intent = &intent;

        let (result, origin) = self
            .cache
            .get_or_dispatch(&intent.idempotency_key, || self.dispatch(adapter.as_ref(), intent))
            .await;

        match origin {
            Origin::Replayed => {
                debug!(status = %result.status, "Replaying cached result");
            }
            Origin::Dispatched => {
                info!(
                    rail = %result.rail,
                    status = %result.status,
                    transaction_id = ?result.rail_transaction_id,
                    "Payment dispatched"
                );
                if let Some(delta) = result.balance_delta_event() {
                    // No subscribers is fine
                    let _ = self.balance.send(delta);
                }
            }
        }

        Ok(result)
    }

    async fn dispatch(&self, adapter: &dyn RailAdapter, intent: &PaymentIntent) -> PaymentResult {
        let spec = adapter
            .translate(intent)
            .with_header("Idempotency-Key", intent.idempotency_key.as_str());

        debug!(rail = %adapter.kind(), path = %spec.path, "Dispatching to rail");

        match self.transport.execute(&spec).await {
            Ok(response) => adapter.normalize(intent, &response),
            Err(err) => {
                warn!(rail = %adapter.kind(), error = %err, "Rail call failed");
                PaymentResult::failed(intent, adapter.kind(), err.failure_kind(), err.failure_reason())
            }
        }
    }
}

impl std::fmt::Debug for PaymentDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDispatcher")
            .field("registry", &self.registry)
            .field("cached", &self.cache.len())
            .finish()
    }
}

fn validate(intent: &PaymentIntent) -> DispatchResult<()> {
    if intent.amount_minor_units <= 0 {
        return Err(DispatchError::invalid_intent(format!(
            "amount must be positive, got {}",
            intent.amount_minor_units
        )));
    }
    if intent.source_ref.trim().is_empty() {
        return Err(DispatchError::invalid_intent("source reference is empty"));
    }
    if intent.destination_ref.trim().is_empty() {
        return Err(DispatchError::invalid_intent("destination reference is empty"));
    }
    if intent.idempotency_key.as_str().trim().is_empty() {
        return Err(DispatchError::invalid_intent("idempotency key is empty"));
    }
    Ok(())
}
