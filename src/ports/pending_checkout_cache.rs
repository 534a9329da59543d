//! PendingCheckoutCache port - short-lived checkout intents.
//!
//! The storefront records a checkout before redirecting the customer to the
//! provider. Entries are advisory; subscription state is always rebuilt from
//! webhook payloads.

use async_trait::async_trait;

use crate::domain::billing::{CheckoutReference, PendingCheckout};
use crate::domain::foundation::DomainError;

#[async_trait]
pub trait PendingCheckoutCache: Send + Sync {
    /// Store `checkout` under its reference, replacing any previous entry.
    async fn put(&self, checkout: PendingCheckout) -> Result<(), DomainError>;

    /// Fetch a checkout that has not expired.
    async fn get(&self, reference: &CheckoutReference)
        -> Result<Option<PendingCheckout>, DomainError>;

    /// Remove and return a checkout, if present.
    async fn take(
        &self,
        reference: &CheckoutReference,
    ) -> Result<Option<PendingCheckout>, DomainError>;
}
