//! Checkout intents recorded before the customer reaches the provider.
//!
//! The storefront stores a `PendingCheckout` keyed by reference when it
//! starts a checkout; the webhook never depends on it and reconciles from
//! the provider's payload alone.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::plan::PlanType;
use crate::domain::foundation::{Email, Timestamp};

/// Prefix of storefront-generated checkout references.
pub const CHECKOUT_REFERENCE_PREFIX: &str = "sub_";

/// Reference handed to the provider when initializing a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutReference(String);

impl CheckoutReference {
    /// Generates `sub_<unix-millis>_<8 hex chars>`.
    pub fn generate(at: Timestamp) -> Self {
        let entropy = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}{}_{}",
            CHECKOUT_REFERENCE_PREFIX,
            at.as_unix_millis(),
            &entropy[..8]
        ))
    }

    pub fn from_string(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckoutReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A checkout the storefront started but the provider has not confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCheckout {
    pub email: Email,
    pub business_name: String,
    pub plan_type: PlanType,
    pub plan_code: String,
    pub reference: CheckoutReference,
    pub created_at: Timestamp,
}

impl PendingCheckout {
    pub fn new(
        email: Email,
        business_name: impl Into<String>,
        plan_type: PlanType,
        plan_code: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            email,
            business_name: business_name.into(),
            plan_type,
            plan_code: plan_code.into(),
            reference: CheckoutReference::generate(now),
            created_at: now,
        }
    }

    /// True once the checkout is older than `ttl_secs`.
    pub fn is_expired(&self, now: Timestamp, ttl_secs: i64) -> bool {
        now.as_unix_millis() - self.created_at.as_unix_millis() > ttl_secs * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_reference_has_expected_shape() {
        let now = Timestamp::now();
        let reference = CheckoutReference::generate(now);

        let rest = reference.as_str().strip_prefix(CHECKOUT_REFERENCE_PREFIX).unwrap();
        let (millis, entropy) = rest.split_once('_').unwrap();
        assert_eq!(millis, now.as_unix_millis().to_string());
        assert_eq!(entropy.len(), 8);
        assert!(entropy.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_references_differ() {
        let now = Timestamp::now();
        assert_ne!(CheckoutReference::generate(now), CheckoutReference::generate(now));
    }

    #[test]
    fn pending_checkout_expires_after_ttl() {
        let created = Timestamp::parse_rfc3339("2024-01-15T10:00:00Z").unwrap();
        let checkout = PendingCheckout::new(
            Email::parse("owner@diner.ng").unwrap(),
            "Jane's Diner",
            PlanType::Starter,
            "PLN_starter",
            created,
        );

        let later = Timestamp::parse_rfc3339("2024-01-15T10:30:00Z").unwrap();
        let much_later = Timestamp::parse_rfc3339("2024-01-15T11:30:00Z").unwrap();
        assert!(!checkout.is_expired(later, 3600));
        assert!(checkout.is_expired(much_later, 3600));
    }
}
