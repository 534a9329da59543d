//! Subscription and payment status vocabularies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Lifecycle status of a subscription row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and renewing.
    Active,

    /// Disabled by the provider (subscription ended or was switched off).
    Inactive,

    /// Customer opted out of renewal.
    Cancelled,

    /// Latest renewal charge failed.
    PaymentFailed,

    /// Known to the provider in a state we do not model yet.
    Pending,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::PaymentFailed => "payment_failed",
            SubscriptionStatus::Pending => "pending",
        }
    }

    /// Maps the provider's `data.status` on `subscription.create`.
    ///
    /// A missing status means the subscription was just created and is
    /// active. Values outside the provider's documented set become
    /// `Pending` rather than failing the delivery.
    pub fn from_provider(status: Option<&str>) -> Self {
        let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) else {
            return SubscriptionStatus::Active;
        };

        match status.to_ascii_lowercase().as_str() {
            "active" => SubscriptionStatus::Active,
            "non-renewing" | "cancelled" => SubscriptionStatus::Cancelled,
            "attention" => SubscriptionStatus::PaymentFailed,
            "complete" | "completed" => SubscriptionStatus::Inactive,
            _ => SubscriptionStatus::Pending,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "payment_failed" => Ok(SubscriptionStatus::PaymentFailed),
            "pending" => Ok(SubscriptionStatus::Pending),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

/// Outcome of a single charge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_provider_status_means_active() {
        assert_eq!(
            SubscriptionStatus::from_provider(None),
            SubscriptionStatus::Active
        );
        assert_eq!(
            SubscriptionStatus::from_provider(Some("  ")),
            SubscriptionStatus::Active
        );
    }

    #[test]
    fn provider_statuses_map_onto_our_lifecycle() {
        use SubscriptionStatus::*;
        let cases = [
            ("active", Active),
            ("ACTIVE", Active),
            ("non-renewing", Cancelled),
            ("cancelled", Cancelled),
            ("attention", PaymentFailed),
            ("complete", Inactive),
            ("completed", Inactive),
            ("paused-by-aliens", Pending),
        ];
        for (raw, expected) in cases {
            assert_eq!(SubscriptionStatus::from_provider(Some(raw)), expected, "{}", raw);
        }
    }

    #[test]
    fn subscription_status_string_roundtrip() {
        use SubscriptionStatus::*;
        for status in [Active, Inactive, Cancelled, PaymentFailed, Pending] {
            assert_eq!(status.as_str().parse::<SubscriptionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn subscription_status_serializes_snake_case() {
        let json = serde_json::to_string(&SubscriptionStatus::PaymentFailed).unwrap();
        assert_eq!(json, "\"payment_failed\"");
    }

    #[test]
    fn unknown_stored_status_is_rejected() {
        assert!("expired".parse::<SubscriptionStatus>().is_err());
        assert!("pending_payment".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn payment_status_displays_lowercase() {
        assert_eq!(PaymentStatus::Success.to_string(), "success");
        assert_eq!(PaymentStatus::Failed.to_string(), "failed");
    }
}
