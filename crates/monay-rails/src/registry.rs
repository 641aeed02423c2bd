//! Rail registry - the dispatch table from rail kind to adapter

use std::sync::Arc;

use monay_types::{DispatchError, DispatchResult, PaymentIntent, RailKind};

use crate::adapter::RailAdapter;
use crate::adapters::{CardProcessorAdapter, InstantPaymentAdapter, StablecoinAdapter};

/// Ordered set of rail adapters, at most one per kind
///
/// Registration order is the default-selection priority: when an intent
/// carries no usable hint, the first adapter that supports it wins.
#[derive(Clone, Default)]
pub struct RailRegistry {
    adapters: Vec<Arc<dyn RailAdapter>>,
}

impl RailRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the card, instant and stablecoin rails, in that order
    pub fn standard() -> Self {
        Self::new()
            .with(CardProcessorAdapter::new())
            .with(InstantPaymentAdapter::new())
            .with(StablecoinAdapter::new())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, adapter: impl RailAdapter + 'static) -> Self {
        self.register(Arc::new(adapter));
        self
    }

    /// Register an adapter; one already registered for the same kind is
    /// replaced in place, keeping its priority
    pub fn register(&mut self, adapter: Arc<dyn RailAdapter>) {
        let kind = adapter.kind();
        match self.adapters.iter_mut().find(|a| a.kind() == kind) {
            Some(slot) => *slot = adapter,
            None => self.adapters.push(adapter),
        }
    }

    /// Get the adapter registered for a kind
    pub fn get(&self, kind: RailKind) -> Option<Arc<dyn RailAdapter>> {
        self.adapters.iter().find(|a| a.kind() == kind).cloned()
    }

    /// Registered kinds in priority order
    pub fn kinds(&self) -> Vec<RailKind> {
        self.adapters.iter().map(|a| a.kind()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RailAdapter>> {
        self.adapters.iter()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Resolve the adapter that will carry an intent
    ///
    /// A hint naming a registered rail is binding: if that rail cannot carry
    /// the intent the result is `NoRailAvailable`. A hint naming an
    /// unregistered rail is ignored in favor of default selection.
    pub fn select(&self, intent: &PaymentIntent) -> DispatchResult<Arc<dyn RailAdapter>> {
        let no_rail = || DispatchError::NoRailAvailable {
            currency: intent.currency,
            hint: intent.rail_hint,
        };

        if let Some(hint) = intent.rail_hint {
            match self.get(hint) {
                Some(adapter) if adapter.supports(intent) => return Ok(adapter),
                Some(_) => return Err(no_rail()),
                None => {
                    tracing::debug!(hint = %hint, "Rail hint not registered, using default selection");
                }
            }
        }

        self.adapters
            .iter()
            .find(|a| a.supports(intent))
            .cloned()
            .ok_or_else(no_rail)
    }
}

impl std::fmt::Debug for RailRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RailRegistry")
            .field("rails", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::RailLimits;
    use monay_types::Currency;

    fn intent(amount: i64, currency: Currency, hint: Option<RailKind>) -> PaymentIntent {
        let builder = PaymentIntent::builder("wallet_1", "bank_1", amount, currency);
        match hint {
            Some(kind) => builder.rail(kind).build(),
            None => builder.build(),
        }
    }

    #[test]
    fn test_standard_order() {
        let registry = RailRegistry::standard();
        assert_eq!(
            registry.kinds(),
            vec![RailKind::CardProcessor, RailKind::InstantPayment, RailKind::Stablecoin]
        );
    }

    #[test]
    fn test_hint_selects_registered_rail() {
        let registry = RailRegistry::standard();
        let adapter = registry
            .select(&intent(5000, Currency::USD, Some(RailKind::InstantPayment)))
            .unwrap();
        assert_eq!(adapter.kind(), RailKind::InstantPayment);
    }

    #[test]
    fn test_default_selection_takes_first_capable() {
        let registry = RailRegistry::standard();

        let usd = registry.select(&intent(5000, Currency::USD, None)).unwrap();
        assert_eq!(usd.kind(), RailKind::CardProcessor);

        // above the card limit, still inside the instant limit
        let large = registry.select(&intent(5_000_000, Currency::USD, None)).unwrap();
        assert_eq!(large.kind(), RailKind::InstantPayment);

        let usdc = registry.select(&intent(5000, Currency::USDC, None)).unwrap();
        assert_eq!(usdc.kind(), RailKind::Stablecoin);
    }

    #[test]
    fn test_incapable_hint_does_not_reroute() {
        let registry = RailRegistry::standard();
        let err = registry
            .select(&intent(5000, Currency::EUR, Some(RailKind::InstantPayment)))
            .err()
            .unwrap();
        assert_eq!(
            err,
            DispatchError::NoRailAvailable {
                currency: Currency::EUR,
                hint: Some(RailKind::InstantPayment),
            }
        );
    }

    #[test]
    fn test_unregistered_hint_falls_back() {
        let registry = RailRegistry::new().with(CardProcessorAdapter::new());
        let adapter = registry
            .select(&intent(5000, Currency::USD, Some(RailKind::Stablecoin)))
            .unwrap();
        assert_eq!(adapter.kind(), RailKind::CardProcessor);
    }

    #[test]
    fn test_no_capable_rail() {
        let registry = RailRegistry::standard();
        assert!(registry.select(&intent(5000, Currency::GBP, None)).is_ok());
        assert!(matches!(
            RailRegistry::new().select(&intent(5000, Currency::USD, None)),
            Err(DispatchError::NoRailAvailable { hint: None, .. })
        ));
    }

    #[test]
    fn test_register_replaces_same_kind_in_place() {
        let mut registry = RailRegistry::standard();
        registry.register(Arc::new(
            CardProcessorAdapter::new().with_limits(RailLimits::new(1, 10)),
        ));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.kinds()[0], RailKind::CardProcessor);
        assert_eq!(
            registry.get(RailKind::CardProcessor).unwrap().limits(),
            RailLimits::new(1, 10)
        );
    }
}
