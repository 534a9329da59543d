//! Paystack webhook event types.
//!
//! Defines the structures for parsing provider webhook payloads.
//! Only fields relevant to our processing are captured; everything else in
//! the provider's schema is ignored.

use serde::{Deserialize, Deserializer, Serialize};

use super::money::MinorUnits;
use super::webhook_errors::WebhookError;

/// Custom-field `variable_name` carrying the restaurant's name.
pub const BUSINESS_NAME_FIELD: &str = "business_name";

/// Custom-field `variable_name` carrying the chosen tier.
pub const PLAN_TYPE_FIELD: &str = "plan_type";

/// Webhook envelope: `{ "event": "...", "data": { ... } }`.
///
/// `data` stays untyped until the event is classified, so events outside
/// our vocabulary are acknowledged whatever shape their data has.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaystackEvent {
    /// Event name (e.g., "subscription.create").
    pub event: String,

    /// Event-specific data object.
    pub data: serde_json::Value,
}

/// Union of the `data` fields used across the events we act on.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaystackEventData {
    #[serde(default)]
    pub customer: Option<PaystackCustomer>,

    /// One-off charges carry `plan: {}` or `plan: null`.
    #[serde(default)]
    pub plan: Option<PaystackPlan>,

    #[serde(default)]
    pub subscription_code: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub next_payment_date: Option<String>,

    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub amount: Option<MinorUnits>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub paid_at: Option<String>,

    /// The provider sends an object, an empty string, or null here.
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: Option<PaystackMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaystackCustomer {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub customer_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaystackPlan {
    #[serde(default)]
    pub plan_code: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub amount: Option<MinorUnits>,

    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaystackMetadata {
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

/// Checkout form field echoed back by the provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomField {
    pub variable_name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub value: serde_json::Value,
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<Option<PaystackMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// Provider event types this service knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaystackEventType {
    /// A subscription was created for a customer.
    SubscriptionCreate,
    /// A charge succeeded (renewal or one-off).
    ChargeSuccess,
    /// Subscription will not renew at period end.
    SubscriptionNotRenew,
    /// Subscription was disabled.
    SubscriptionDisable,
    /// A renewal invoice could not be charged.
    InvoicePaymentFailed,
    /// Anything else in the provider's vocabulary.
    Unknown(String),
}

impl PaystackEventType {
    pub fn parse(name: &str) -> Self {
        match name {
            "subscription.create" => PaystackEventType::SubscriptionCreate,
            "charge.success" => PaystackEventType::ChargeSuccess,
            "subscription.not_renew" => PaystackEventType::SubscriptionNotRenew,
            "subscription.disable" => PaystackEventType::SubscriptionDisable,
            "invoice.payment_failed" => PaystackEventType::InvoicePaymentFailed,
            other => PaystackEventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaystackEventType::SubscriptionCreate => "subscription.create",
            PaystackEventType::ChargeSuccess => "charge.success",
            PaystackEventType::SubscriptionNotRenew => "subscription.not_renew",
            PaystackEventType::SubscriptionDisable => "subscription.disable",
            PaystackEventType::InvoicePaymentFailed => "invoice.payment_failed",
            PaystackEventType::Unknown(name) => name,
        }
    }
}

impl PaystackEvent {
    /// Parses a verified request body.
    ///
    /// The body must be a JSON object with a string `event` and an object
    /// `data`; anything else is `MalformedPayload`.
    pub fn from_slice(payload: &[u8]) -> Result<Self, WebhookError> {
        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

        match value.get("event") {
            Some(serde_json::Value::String(_)) => {}
            Some(_) => {
                return Err(WebhookError::MalformedPayload(
                    "`event` must be a string".to_string(),
                ))
            }
            None => return Err(WebhookError::MalformedPayload("missing `event`".to_string())),
        }

        if !value.get("data").is_some_and(serde_json::Value::is_object) {
            return Err(WebhookError::MalformedPayload(
                "`data` must be an object".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }

    pub fn parsed_type(&self) -> PaystackEventType {
        PaystackEventType::parse(&self.event)
    }

    /// Deserializes `data` into the typed shape used by known events.
    pub fn deserialize_data(&self) -> Result<PaystackEventData, WebhookError> {
        PaystackEventData::deserialize(&self.data)
            .map_err(|e| WebhookError::MalformedPayload(format!("invalid `data`: {}", e)))
    }
}

impl PaystackEventData {
    /// Raw `customer.email`, before normalization.
    pub fn customer_email(&self) -> Option<&str> {
        self.customer
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .filter(|e| !e.trim().is_empty())
    }

    /// `plan.plan_code` when present and non-empty.
    pub fn plan_code(&self) -> Option<&str> {
        self.plan
            .as_ref()
            .and_then(|p| p.plan_code.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    /// Looks up a checkout custom field by `variable_name`.
    ///
    /// String values are returned trimmed; numbers and booleans are rendered;
    /// null, blank, and structured values count as absent.
    pub fn custom_field(&self, variable_name: &str) -> Option<String> {
        let field = self
            .metadata
            .as_ref()?
            .custom_fields
            .iter()
            .find(|f| f.variable_name == variable_name)?;

        match &field.value {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
