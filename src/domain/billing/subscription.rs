//! Subscription record and the two write shapes that mutate it.
//!
//! - `SubscriptionUpsert` - full record from `subscription.create`, keyed on email
//! - `SubscriptionPatch` - partial status update from every other event

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::plan::PlanType;
use super::status::SubscriptionStatus;
use crate::domain::foundation::{Email, Timestamp};

/// One row per paying customer, keyed by normalized email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub email: Email,
    pub customer_code: Option<String>,
    pub business_name: Option<String>,
    pub plan_type: Option<PlanType>,
    pub plan_code: Option<String>,
    pub plan_name: Option<String>,
    pub subscription_code: Option<String>,
    pub status: SubscriptionStatus,
    /// Major currency units.
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub next_payment_date: Option<Timestamp>,
    pub last_payment_date: Option<Timestamp>,
    pub last_payment_reference: Option<String>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Builds a fresh row from an upsert that found no existing record.
    pub fn from_upsert(upsert: &SubscriptionUpsert) -> Self {
        Self {
            email: upsert.email.clone(),
            customer_code: upsert.customer_code.clone(),
            business_name: upsert.business_name.clone(),
            plan_type: upsert.plan_type,
            plan_code: upsert.plan_code.clone(),
            plan_name: upsert.plan_name.clone(),
            subscription_code: upsert.subscription_code.clone(),
            status: upsert.status,
            amount: upsert.amount,
            currency: upsert.currency.clone(),
            next_payment_date: upsert.next_payment_date,
            last_payment_date: None,
            last_payment_reference: None,
            cancelled_at: None,
            created_at: upsert.updated_at,
            updated_at: upsert.updated_at,
        }
    }

    /// Overwrites every upsert-owned column, leaving payment history and
    /// `created_at` untouched.
    pub fn apply_upsert(&mut self, upsert: &SubscriptionUpsert) {
        self.customer_code = upsert.customer_code.clone();
        self.business_name = upsert.business_name.clone();
        self.plan_type = upsert.plan_type;
        self.plan_code = upsert.plan_code.clone();
        self.plan_name = upsert.plan_name.clone();
        self.subscription_code = upsert.subscription_code.clone();
        self.status = upsert.status;
        self.amount = upsert.amount;
        self.currency = upsert.currency.clone();
        self.next_payment_date = upsert.next_payment_date;
        self.updated_at = upsert.updated_at;
    }

    /// Applies a partial update. Fields absent from the patch are kept.
    pub fn apply_patch(&mut self, patch: &SubscriptionPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(paid_at) = patch.last_payment_date {
            self.last_payment_date = Some(paid_at);
        }
        if let Some(reference) = &patch.last_payment_reference {
            self.last_payment_reference = Some(reference.clone());
        }
        if let Some(cancelled_at) = patch.cancelled_at {
            self.cancelled_at = Some(cancelled_at);
        }
        self.updated_at = patch.updated_at;
    }
}

/// Full record written by `subscription.create`; conflict target is `email`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionUpsert {
    pub email: Email,
    pub customer_code: Option<String>,
    pub business_name: Option<String>,
    pub plan_type: Option<PlanType>,
    pub plan_code: Option<String>,
    pub plan_name: Option<String>,
    pub subscription_code: Option<String>,
    pub status: SubscriptionStatus,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub next_payment_date: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Partial update keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl SubscriptionPatch {
    fn status_only(status: SubscriptionStatus, at: Timestamp) -> Self {
        Self {
            status: Some(status),
            last_payment_date: None,
            last_payment_reference: None,
            cancelled_at: None,
            updated_at: at,
        }
    }

    /// Successful renewal charge.
    pub fn paid(reference: impl Into<String>, at: Timestamp) -> Self {
        Self {
            last_payment_date: Some(at),
            last_payment_reference: Some(reference.into()),
            ..Self::status_only(SubscriptionStatus::Active, at)
        }
    }

    /// Customer chose not to renew.
    pub fn cancelled(at: Timestamp) -> Self {
        Self {
            cancelled_at: Some(at),
            ..Self::status_only(SubscriptionStatus::Cancelled, at)
        }
    }

    pub fn disabled(at: Timestamp) -> Self {
        Self::status_only(SubscriptionStatus::Inactive, at)
    }

    pub fn payment_failed(at: Timestamp) -> Self {
        Self::status_only(SubscriptionStatus::PaymentFailed, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert(email: &str, business: &str) -> SubscriptionUpsert {
        SubscriptionUpsert {
            email: Email::parse(email).unwrap(),
            customer_code: Some("CUS_abc".to_string()),
            business_name: Some(business.to_string()),
            plan_type: Some(PlanType::Pro),
            plan_code: Some("PLN_pro".to_string()),
            plan_name: Some("Pro Monthly".to_string()),
            subscription_code: Some("SUB_1".to_string()),
            status: SubscriptionStatus::Active,
            amount: Some(Decimal::new(2_500_000, 2)),
            currency: Some("NGN".to_string()),
            next_payment_date: None,
            updated_at: Timestamp::now(),
        }
    }

    #[test]
    fn from_upsert_starts_without_payment_history() {
        let record = Subscription::from_upsert(&upsert("jane@x.com", "Jane's Diner"));

        assert_eq!(record.email.as_str(), "jane@x.com");
        assert_eq!(record.business_name.as_deref(), Some("Jane's Diner"));
        assert!(record.last_payment_date.is_none());
        assert!(record.cancelled_at.is_none());
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn apply_upsert_keeps_created_at_and_payment_history() {
        let mut record = Subscription::from_upsert(&upsert("jane@x.com", "Old Name"));
        let created_at = record.created_at;
        record.apply_patch(&SubscriptionPatch::paid("ref_1", Timestamp::now()));

        record.apply_upsert(&upsert("jane@x.com", "New Name"));

        assert_eq!(record.business_name.as_deref(), Some("New Name"));
        assert_eq!(record.created_at, created_at);
        assert_eq!(record.last_payment_reference.as_deref(), Some("ref_1"));
    }

    #[test]
    fn paid_patch_activates_and_records_reference() {
        let mut record = Subscription::from_upsert(&upsert("jane@x.com", "Diner"));
        record.status = SubscriptionStatus::PaymentFailed;
        let at = Timestamp::now();

        record.apply_patch(&SubscriptionPatch::paid("ref_42", at));

        assert_eq!(record.status, SubscriptionStatus::Active);
        assert_eq!(record.last_payment_date, Some(at));
        assert_eq!(record.last_payment_reference.as_deref(), Some("ref_42"));
    }

    #[test]
    fn cancelled_patch_stamps_cancelled_at() {
        let mut record = Subscription::from_upsert(&upsert("jane@x.com", "Diner"));
        let at = Timestamp::now();

        record.apply_patch(&SubscriptionPatch::cancelled(at));

        assert_eq!(record.status, SubscriptionStatus::Cancelled);
        assert_eq!(record.cancelled_at, Some(at));
    }

    #[test]
    fn status_patches_do_not_touch_payment_fields() {
        let mut record = Subscription::from_upsert(&upsert("jane@x.com", "Diner"));
        record.apply_patch(&SubscriptionPatch::paid("ref_1", Timestamp::now()));

        record.apply_patch(&SubscriptionPatch::disabled(Timestamp::now()));
        assert_eq!(record.status, SubscriptionStatus::Inactive);
        assert_eq!(record.last_payment_reference.as_deref(), Some("ref_1"));

        record.apply_patch(&SubscriptionPatch::payment_failed(Timestamp::now()));
        assert_eq!(record.status, SubscriptionStatus::PaymentFailed);
        assert!(record.cancelled_at.is_none());
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = SubscriptionPatch::disabled(Timestamp::now());
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(json["status"], "inactive");
        assert!(json.get("cancelled_at").is_none());
        assert!(json.get("last_payment_reference").is_none());
        assert!(json.get("updated_at").is_some());
    }
}
