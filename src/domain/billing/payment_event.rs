//! Append-only log of charge attempts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::PaymentStatus;
use crate::domain::foundation::{Email, Timestamp};

/// Prefix of references synthesized for failures the provider sent without one.
pub const FAILED_REFERENCE_PREFIX: &str = "failed_";

/// One charge attempt. Rows are inserted once and never updated;
/// `reference` is unique across the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub email: Email,
    pub reference: String,
    /// Major currency units.
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub paid_at: Timestamp,
}

impl PaymentEvent {
    pub fn success(
        email: Email,
        reference: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        paid_at: Timestamp,
    ) -> Self {
        Self {
            email,
            reference: reference.into(),
            amount,
            currency: currency.into(),
            status: PaymentStatus::Success,
            paid_at,
        }
    }

    /// A failed attempt. When the provider omitted the reference one is
    /// synthesized as `failed_<unix-millis><6 random digits>`.
    pub fn failed(
        email: Email,
        reference: Option<String>,
        amount: Decimal,
        currency: impl Into<String>,
        at: Timestamp,
    ) -> Self {
        let reference = reference
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| synthesize_failed_reference(at));

        Self {
            email,
            reference,
            amount,
            currency: currency.into(),
            status: PaymentStatus::Failed,
            paid_at: at,
        }
    }
}

/// Digits-only reference for a failure sent without one. The random suffix
/// keeps concurrent failures within one millisecond distinct.
pub fn synthesize_failed_reference(at: Timestamp) -> String {
    let suffix = Uuid::new_v4().as_u128() % 1_000_000;
    format!("{}{}{:06}", FAILED_REFERENCE_PREFIX, at.as_unix_millis(), suffix)
}
