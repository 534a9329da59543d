//! SubscriptionStore port - persistence for subscriptions and payment events.
//!
//! Webhook deliveries are at-least-once, so every write here must be
//! idempotent:
//!
//! - `upsert_subscription` replaces the row keyed by email
//! - `update_subscription` sets the same columns to the same values
//! - `insert_payment_event` ignores a reference it has already stored
//!
//! # Example
//!
//! ```ignore
//! let touched = store.update_subscription(&email, &SubscriptionPatch::disabled(now)).await?;
//! if touched == 0 {
//!     tracing::warn!(email = %email, "No subscription row for update");
//! }
//! ```

use async_trait::async_trait;

use crate::domain::billing::{PaymentEvent, Subscription, SubscriptionPatch, SubscriptionUpsert};
use crate::domain::foundation::{DomainError, Email};

/// Result of appending to the payment log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row written.
    Inserted,
    /// A row with the same reference already exists; nothing written.
    Duplicate,
}

/// Port for the subscription table and the payment event log.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert or fully replace the subscription keyed by `upsert.email`.
    ///
    /// Payment history columns and `created_at` of an existing row are kept.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert_subscription(&self, upsert: &SubscriptionUpsert) -> Result<(), DomainError>;

    /// Apply `patch` to the row keyed by `email`.
    ///
    /// Returns the number of rows touched; zero when no row exists.
    async fn update_subscription(
        &self,
        email: &Email,
        patch: &SubscriptionPatch,
    ) -> Result<u64, DomainError>;

    /// Append a payment event unless its reference is already recorded.
    async fn insert_payment_event(&self, event: &PaymentEvent)
        -> Result<InsertOutcome, DomainError>;

    /// Load the subscription for `email`.
    async fn find_subscription(&self, email: &Email) -> Result<Option<Subscription>, DomainError>;

    /// Payment events recorded for `email`, oldest first.
    async fn list_payment_events(&self, email: &Email) -> Result<Vec<PaymentEvent>, DomainError>;
}
