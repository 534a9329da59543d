//! Event-to-write mapping for subscription reconciliation.
//!
//! `BillingAction::from_event` is pure: given a verified, parsed event and
//! the current time it decides which store writes the event requires. The
//! application layer executes the writes.
//!
//! | Event                    | Writes                                      |
//! |--------------------------|---------------------------------------------|
//! | `subscription.create`    | upsert subscription (conflict on email)     |
//! | `charge.success` w/ plan | status=active patch, then success payment   |
//! | `subscription.not_renew` | status=cancelled + cancelled_at patch       |
//! | `subscription.disable`   | status=inactive patch                       |
//! | `invoice.payment_failed` | failed payment, then status=payment_failed  |
//! | anything else            | none                                        |

use rust_decimal::Decimal;

use super::money::MinorUnits;
use super::paystack_event::{
    PaystackEvent, PaystackEventData, PaystackEventType, BUSINESS_NAME_FIELD, PLAN_TYPE_FIELD,
};
use super::payment_event::PaymentEvent;
use super::plan::PlanType;
use super::status::SubscriptionStatus;
use super::subscription::{SubscriptionPatch, SubscriptionUpsert};
use super::webhook_errors::WebhookError;
use crate::domain::foundation::{Email, Timestamp};

/// Inputs to a transition other than the event itself.
#[derive(Debug, Clone)]
pub struct TransitionContext {
    /// Time the delivery is being applied; stamps every written row.
    pub now: Timestamp,
    /// Currency recorded when a failure event omits one.
    pub default_currency: String,
}

/// Store writes required by one event.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingAction {
    /// `subscription.create`.
    Upsert(SubscriptionUpsert),

    /// Single status update keyed by email.
    Update {
        email: Email,
        patch: SubscriptionPatch,
    },

    /// Renewal charge: update subscription, then append a success row.
    ChargeSucceeded {
        email: Email,
        patch: SubscriptionPatch,
        payment: PaymentEvent,
    },

    /// Renewal failure: append a failed row, then update subscription.
    PaymentFailed {
        email: Email,
        payment: PaymentEvent,
        patch: SubscriptionPatch,
    },

    /// Nothing to write; acknowledged as success.
    Ignore { reason: String },
}

impl BillingAction {
    /// Classifies `event` and builds the writes it requires.
    ///
    /// # Errors
    ///
    /// - `MalformedPayload` - `data` does not match the typed shape
    /// - `MissingField` - a recognized event lacks a required field
    pub fn from_event(
        event: &PaystackEvent,
        ctx: &TransitionContext,
    ) -> Result<Self, WebhookError> {
        match event.parsed_type() {
            PaystackEventType::SubscriptionCreate => {
                subscription_created(&event.deserialize_data()?, ctx)
            }
            PaystackEventType::ChargeSuccess => charge_succeeded(&event.deserialize_data()?, ctx),
            PaystackEventType::SubscriptionNotRenew => Ok(BillingAction::Update {
                email: customer_email(&event.deserialize_data()?)?,
                patch: SubscriptionPatch::cancelled(ctx.now),
            }),
            PaystackEventType::SubscriptionDisable => Ok(BillingAction::Update {
                email: customer_email(&event.deserialize_data()?)?,
                patch: SubscriptionPatch::disabled(ctx.now),
            }),
            PaystackEventType::InvoicePaymentFailed => {
                invoice_payment_failed(&event.deserialize_data()?, ctx)
            }
            PaystackEventType::Unknown(name) => Ok(BillingAction::Ignore {
                reason: format!("unhandled event type: {}", name),
            }),
        }
    }

    /// Number of store writes this action performs.
    pub fn write_count(&self) -> usize {
        match self {
            BillingAction::Upsert(_) | BillingAction::Update { .. } => 1,
            BillingAction::ChargeSucceeded { .. } | BillingAction::PaymentFailed { .. } => 2,
            BillingAction::Ignore { .. } => 0,
        }
    }

    /// Email the action is keyed on, if any.
    pub fn email(&self) -> Option<&Email> {
        match self {
            BillingAction::Upsert(upsert) => Some(&upsert.email),
            BillingAction::Update { email, .. }
            | BillingAction::ChargeSucceeded { email, .. }
            | BillingAction::PaymentFailed { email, .. } => Some(email),
            BillingAction::Ignore { .. } => None,
        }
    }

    /// Payment reference the action records, if any.
    pub fn reference(&self) -> Option<&str> {
        match self {
            BillingAction::ChargeSucceeded { payment, .. }
            | BillingAction::PaymentFailed { payment, .. } => Some(&payment.reference),
            _ => None,
        }
    }
}

fn customer_email(data: &PaystackEventData) -> Result<Email, WebhookError> {
    let raw = data
        .customer_email()
        .ok_or(WebhookError::MissingField("customer.email"))?;
    Email::parse(raw).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
}

fn subscription_created(
    data: &PaystackEventData,
    ctx: &TransitionContext,
) -> Result<BillingAction, WebhookError> {
    let email = customer_email(data)?;
    let plan = data.plan.clone().unwrap_or_default();

    let plan_type = data
        .custom_field(PLAN_TYPE_FIELD)
        .and_then(|raw| match raw.parse::<PlanType>() {
            Ok(plan_type) => Some(plan_type),
            Err(e) => {
                tracing::warn!(email = %email, plan_type = %raw, error = %e, "Unrecognized plan type; storing null");
                None
            }
        });

    Ok(BillingAction::Upsert(SubscriptionUpsert {
        customer_code: data.customer.as_ref().and_then(|c| c.customer_code.clone()),
        business_name: data.custom_field(BUSINESS_NAME_FIELD),
        plan_type,
        plan_code: plan.plan_code.filter(|c| !c.trim().is_empty()),
        plan_name: plan.name,
        subscription_code: data.subscription_code.clone(),
        status: SubscriptionStatus::from_provider(data.status.as_deref()),
        amount: plan.amount.map(MinorUnits::to_major),
        currency: plan.currency.or_else(|| data.currency.clone()),
        next_payment_date: data
            .next_payment_date
            .as_deref()
            .and_then(Timestamp::parse_rfc3339),
        updated_at: ctx.now,
        email,
    }))
}

fn charge_succeeded(
    data: &PaystackEventData,
    ctx: &TransitionContext,
) -> Result<BillingAction, WebhookError> {
    if data.plan_code().is_none() {
        return Ok(BillingAction::Ignore {
            reason: "charge is not attached to a subscription plan".to_string(),
        });
    }

    let email = customer_email(data)?;
    let reference = data
        .reference
        .clone()
        .filter(|r| !r.trim().is_empty())
        .ok_or(WebhookError::MissingField("reference"))?;
    let amount = data.amount.ok_or(WebhookError::MissingField("amount"))?;
    let currency = data
        .currency
        .clone()
        .unwrap_or_else(|| ctx.default_currency.clone());
    let paid_at = data
        .paid_at
        .as_deref()
        .and_then(Timestamp::parse_rfc3339)
        .unwrap_or(ctx.now);

    Ok(BillingAction::ChargeSucceeded {
        patch: SubscriptionPatch::paid(reference.clone(), ctx.now),
        payment: PaymentEvent::success(email.clone(), reference, amount.to_major(), currency, paid_at),
        email,
    })
}

fn invoice_payment_failed(
    data: &PaystackEventData,
    ctx: &TransitionContext,
) -> Result<BillingAction, WebhookError> {
    let email = customer_email(data)?;
    let amount = data.amount.map(MinorUnits::to_major).unwrap_or(Decimal::ZERO);
    let currency = data
        .currency
        .clone()
        .unwrap_or_else(|| ctx.default_currency.clone());

    Ok(BillingAction::PaymentFailed {
        payment: PaymentEvent::failed(email.clone(), data.reference.clone(), amount, currency, ctx.now),
        patch: SubscriptionPatch::payment_failed(ctx.now),
        email,
    })
}
