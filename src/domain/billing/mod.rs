//! Billing domain - subscription reconciliation from provider webhooks.

mod checkout;
mod money;
mod payment_event;
mod paystack_event;
mod plan;
mod status;
mod subscription;
mod transitions;
mod webhook_errors;
mod webhook_verifier;

pub use checkout::{CheckoutReference, PendingCheckout, CHECKOUT_REFERENCE_PREFIX};
pub use money::MinorUnits;
pub use payment_event::{PaymentEvent, FAILED_REFERENCE_PREFIX};
pub use paystack_event::{
    CustomField, PaystackCustomer, PaystackEvent, PaystackEventData, PaystackEventType,
    PaystackMetadata, PaystackPlan, BUSINESS_NAME_FIELD, PLAN_TYPE_FIELD,
};
pub use plan::PlanType;
pub use status::{PaymentStatus, SubscriptionStatus};
pub use subscription::{Subscription, SubscriptionPatch, SubscriptionUpsert};
pub use transitions::{BillingAction, TransitionContext};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::WebhookVerifier;
