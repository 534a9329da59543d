//! In-memory pending checkout cache with a fixed time-to-live.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::{CheckoutReference, PendingCheckout};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::PendingCheckoutCache;

/// Default lifetime of a checkout intent.
pub const DEFAULT_CHECKOUT_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Clone)]
pub struct InMemoryPendingCheckoutCache {
    entries: Arc<RwLock<HashMap<CheckoutReference, PendingCheckout>>>,
    ttl_secs: i64,
}

impl InMemoryPendingCheckoutCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs,
        }
    }

    /// Drop expired entries; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Timestamp::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, checkout| !checkout.is_expired(now, self.ttl_secs));
        before - entries.len()
    }
}

impl Default for InMemoryPendingCheckoutCache {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKOUT_TTL_SECS)
    }
}

#[async_trait]
impl PendingCheckoutCache for InMemoryPendingCheckoutCache {
    async fn put(&self, checkout: PendingCheckout) -> Result<(), DomainError> {
        self.entries
            .write()
            .await
            .insert(checkout.reference.clone(), checkout);
        Ok(())
    }

    async fn get(
        &self,
        reference: &CheckoutReference,
    ) -> Result<Option<PendingCheckout>, DomainError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(reference)
            .filter(|checkout| !checkout.is_expired(Timestamp::now(), self.ttl_secs))
            .cloned())
    }

    async fn take(
        &self,
        reference: &CheckoutReference,
    ) -> Result<Option<PendingCheckout>, DomainError> {
        Ok(self.entries.write().await.remove(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanType;
    use crate::domain::foundation::Email;

    fn checkout(at: Timestamp) -> PendingCheckout {
        PendingCheckout::new(
            Email::parse("owner@diner.ng").unwrap(),
            "Jane's Diner",
            PlanType::Enterprise,
            "PLN_ent",
            at,
        )
    }

    #[tokio::test]
    async fn put_then_get_returns_checkout() {
        let cache = InMemoryPendingCheckoutCache::default();
        let pending = checkout(Timestamp::now());
        let reference = pending.reference.clone();

        cache.put(pending.clone()).await.unwrap();

        assert_eq!(cache.get(&reference).await.unwrap(), Some(pending));
    }

    #[tokio::test]
    async fn take_removes_entry() {
        let cache = InMemoryPendingCheckoutCache::default();
        let pending = checkout(Timestamp::now());
        let reference = pending.reference.clone();
        cache.put(pending).await.unwrap();

        assert!(cache.take(&reference).await.unwrap().is_some());
        assert!(cache.get(&reference).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_hidden_and_purged() {
        let cache = InMemoryPendingCheckoutCache::new(60);
        let stale = checkout(Timestamp::parse_rfc3339("2020-01-01T00:00:00Z").unwrap());
        let reference = stale.reference.clone();
        cache.put(stale).await.unwrap();

        assert!(cache.get(&reference).await.unwrap().is_none());
        assert_eq!(cache.purge_expired().await, 1);
    }
}
