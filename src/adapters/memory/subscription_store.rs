//! In-memory subscription store for tests and local development.
//!
//! Mirrors the relational store's conflict rules: one subscription per
//! email, one payment event per reference. Supports failure injection and
//! artificial latency so the webhook's error paths can be exercised.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::billing::{PaymentEvent, Subscription, SubscriptionPatch, SubscriptionUpsert};
use crate::domain::foundation::{DomainError, Email, ErrorCode};
use crate::ports::{InsertOutcome, SubscriptionStore};

/// Write operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    UpsertSubscription,
    UpdateSubscription,
    InsertPaymentEvent,
}

#[derive(Debug, Default)]
struct StoreState {
    subscriptions: HashMap<Email, Subscription>,
    payments: Vec<PaymentEvent>,
    failing: HashSet<StoreOperation>,
    delay: Option<Duration>,
}

/// Subscription store backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionStore {
    state: Arc<RwLock<StoreState>>,
    write_calls: Arc<AtomicUsize>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `operation` fail with `StoreUnavailable`.
    pub async fn fail_on(&self, operation: StoreOperation) {
        self.state.write().await.failing.insert(operation);
    }

    /// Make all write operations fail.
    pub async fn fail_all_writes(&self) {
        let mut state = self.state.write().await;
        state.failing.insert(StoreOperation::UpsertSubscription);
        state.failing.insert(StoreOperation::UpdateSubscription);
        state.failing.insert(StoreOperation::InsertPaymentEvent);
    }

    /// Clear injected failures.
    pub async fn recover(&self) {
        self.state.write().await.failing.clear();
    }

    /// Delay every operation by `delay` before it runs.
    pub async fn set_delay(&self, delay: Duration) {
        self.state.write().await.delay = Some(delay);
    }

    /// Number of write calls received, successful or not.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Every recorded payment event, in insertion order.
    pub async fn payment_events(&self) -> Vec<PaymentEvent> {
        self.state.read().await.payments.clone()
    }

    pub async fn subscription_count(&self) -> usize {
        self.state.read().await.subscriptions.len()
    }

    /// Seed a row directly, bypassing write accounting.
    pub async fn seed(&self, subscription: Subscription) {
        self.state
            .write()
            .await
            .subscriptions
            .insert(subscription.email.clone(), subscription);
    }

    async fn begin_write(&self, operation: StoreOperation) -> Result<(), DomainError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if self.state.read().await.failing.contains(&operation) {
            return Err(DomainError::new(
                ErrorCode::StoreUnavailable,
                format!("injected failure on {:?}", operation),
            ));
        }
        Ok(())
    }

    async fn pause(&self) {
        let delay = self.state.read().await.delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn upsert_subscription(&self, upsert: &SubscriptionUpsert) -> Result<(), DomainError> {
        self.begin_write(StoreOperation::UpsertSubscription).await?;

        let mut state = self.state.write().await;
        state
            .subscriptions
            .entry(upsert.email.clone())
            .and_modify(|existing| existing.apply_upsert(upsert))
            .or_insert_with(|| Subscription::from_upsert(upsert));
        Ok(())
    }

    async fn update_subscription(
        &self,
        email: &Email,
        patch: &SubscriptionPatch,
    ) -> Result<u64, DomainError> {
        self.begin_write(StoreOperation::UpdateSubscription).await?;

        let mut state = self.state.write().await;
        match state.subscriptions.get_mut(email) {
            Some(subscription) => {
                subscription.apply_patch(patch);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_payment_event(
        &self,
        event: &PaymentEvent,
    ) -> Result<InsertOutcome, DomainError> {
        self.begin_write(StoreOperation::InsertPaymentEvent).await?;

        let mut state = self.state.write().await;
        if state.payments.iter().any(|p| p.reference == event.reference) {
            return Ok(InsertOutcome::Duplicate);
        }
        state.payments.push(event.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_subscription(&self, email: &Email) -> Result<Option<Subscription>, DomainError> {
        self.pause().await;
        Ok(self.state.read().await.subscriptions.get(email).cloned())
    }

    async fn list_payment_events(&self, email: &Email) -> Result<Vec<PaymentEvent>, DomainError> {
        self.pause().await;
        Ok(self
            .state
            .read()
            .await
            .payments
            .iter()
            .filter(|p| &p.email == email)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{PlanType, SubscriptionStatus};
    use crate::domain::foundation::Timestamp;
    use rust_decimal::Decimal;

    fn email() -> Email {
        Email::parse("owner@diner.ng").unwrap()
    }

    fn upsert(business: &str) -> SubscriptionUpsert {
        SubscriptionUpsert {
            email: email(),
            customer_code: Some("CUS_1".to_string()),
            business_name: Some(business.to_string()),
            plan_type: Some(PlanType::Starter),
            plan_code: Some("PLN_starter".to_string()),
            plan_name: Some("Starter".to_string()),
            subscription_code: Some("SUB_1".to_string()),
            status: SubscriptionStatus::Active,
            amount: Some(Decimal::new(500_000, 2)),
            currency: Some("NGN".to_string()),
            next_payment_date: None,
            updated_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let store = InMemorySubscriptionStore::new();

        store.upsert_subscription(&upsert("First")).await.unwrap();
        store.upsert_subscription(&upsert("Second")).await.unwrap();

        let row = store.find_subscription(&email()).await.unwrap().unwrap();
        assert_eq!(row.business_name.as_deref(), Some("Second"));
        assert_eq!(store.subscription_count().await, 1);
        assert_eq!(store.write_calls(), 2);
    }

    #[tokio::test]
    async fn update_without_row_touches_nothing() {
        let store = InMemorySubscriptionStore::new();

        let touched = store
            .update_subscription(&email(), &SubscriptionPatch::disabled(Timestamp::now()))
            .await
            .unwrap();

        assert_eq!(touched, 0);
        assert_eq!(store.subscription_count().await, 0);
    }

    #[tokio::test]
    async fn duplicate_reference_is_ignored() {
        let store = InMemorySubscriptionStore::new();
        let event = PaymentEvent::success(
            email(),
            "ref_1",
            Decimal::new(100, 2),
            "NGN",
            Timestamp::now(),
        );

        assert_eq!(
            store.insert_payment_event(&event).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_payment_event(&event).await.unwrap(),
            InsertOutcome::Duplicate
        );
        assert_eq!(store.payment_events().await.len(), 1);
        assert_eq!(store.list_payment_events(&email()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn injected_failure_surfaces_as_store_unavailable() {
        let store = InMemorySubscriptionStore::new();
        store.fail_on(StoreOperation::UpsertSubscription).await;

        let err = store.upsert_subscription(&upsert("Diner")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreUnavailable);
        assert_eq!(store.write_calls(), 1);

        store.recover().await;
        assert!(store.upsert_subscription(&upsert("Diner")).await.is_ok());
    }
}
