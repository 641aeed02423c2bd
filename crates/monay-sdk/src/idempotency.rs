//! Idempotency cache
//!
//! Maps an idempotency key to the one `PaymentResult` it produced. Each key
//! owns a once-cell, so concurrent submissions of the same key wait on a
//! single dispatch instead of racing a check-then-insert.

use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use monay_types::{IdempotencyKey, PaymentResult};

/// Whether a result came from this call's dispatch or from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Dispatched,
    Replayed,
}

/// Per-key cache of settled payment results
#[derive(Debug, Clone, Default)]
pub struct IdempotencyCache {
    entries: Arc<DashMap<IdempotencyKey, Arc<OnceCell<PaymentResult>>>>,
}

impl IdempotencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for a key, if one has settled
    pub fn get(&self, key: &IdempotencyKey) -> Option<PaymentResult> {
        self.entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Return the cached result for `key`, or run `dispatch` to produce it
    ///
    /// Retryable failures are handed back but not stored, so a later
    /// submission of the same key dispatches again.
    pub async fn get_or_dispatch<F, Fut>(&self, key: &IdempotencyKey, dispatch: F) -> (PaymentResult, Origin)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PaymentResult>,
    {
        let cell = Arc::clone(&*self.entries.entry(key.clone()).or_default());

        let ran = AtomicBool::new(false);
        let ran_ref = &ran;
        let outcome = cell
            .get_or_try_init(move || async move {
                ran_ref.store(true, Ordering::SeqCst);
                let result = dispatch().await;
                if result.is_retryable() {
                    Err(result)
                } else {
                    Ok(result)
                }
            })
            .await;

        let origin = if ran.load(Ordering::SeqCst) {
            Origin::Dispatched
        } else {
            Origin::Replayed
        };

        match outcome {
            Ok(result) => (result.clone(), origin),
            // The empty cell stays in the map: a duplicate may already be
            // initializing it, and later callers retry through it.
            Err(result) => (result, Origin::Dispatched),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every cached result
    pub fn clear(&self) {
        self.entries.clear();
    }
}
