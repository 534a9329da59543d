//! ProcessPaystackWebhookHandler - Command handler for provider subscription webhooks.
//!
//! Verifies the signature over the raw body, parses the envelope, maps the
//! event to store writes and applies them under a single deadline. Success
//! is returned only after every required write has committed.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::billing::{
    BillingAction, PaymentEvent, PaystackEvent, SubscriptionPatch, TransitionContext,
    WebhookError, WebhookVerifier,
};
use crate::domain::foundation::{Email, Timestamp};
use crate::ports::{InsertOutcome, SubscriptionStore};

/// Command to process one webhook delivery.
#[derive(Debug, Clone)]
pub struct ProcessPaystackWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// Hex signature header, if present.
    pub signature: Option<String>,
}

/// Result of a delivery that should be acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Writes for a recognized event committed.
    Applied { event_type: String, writes: usize },
    /// Valid delivery that requires no writes.
    Ignored { event_type: String, reason: String },
}

/// Handler for provider webhook deliveries.
pub struct ProcessPaystackWebhookHandler {
    store: Arc<dyn SubscriptionStore>,
    verifier: Option<WebhookVerifier>,
    default_currency: String,
    store_timeout: Duration,
}

impl ProcessPaystackWebhookHandler {
    /// `verifier` is `None` when no signing secret is configured; every
    /// delivery is then rejected with `MissingSecret`.
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        verifier: Option<WebhookVerifier>,
        default_currency: impl Into<String>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            verifier,
            default_currency: default_currency.into(),
            store_timeout,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessPaystackWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        // 1. Authenticate the raw bytes
        let verifier = self.verifier.as_ref().ok_or_else(|| {
            let err = WebhookError::MissingSecret;
            tracing::error!(
                kind = err.kind(),
                "Webhook signing secret is not configured; rejecting delivery"
            );
            err
        })?;

        if let Err(e) = verifier.verify(&cmd.payload, cmd.signature.as_deref()) {
            tracing::warn!(kind = e.kind(), error = %e, "Webhook signature verification failed");
            return Err(e);
        }

        // 2. Parse the envelope
        let event = PaystackEvent::from_slice(&cmd.payload).map_err(|e| {
            tracing::warn!(kind = e.kind(), error = %e, "Rejecting malformed webhook payload");
            e
        })?;
        let event_type = event.event.clone();

        // 3. Classify
        let ctx = TransitionContext {
            now: Timestamp::now(),
            default_currency: self.default_currency.clone(),
        };
        let action = BillingAction::from_event(&event, &ctx).map_err(|e| {
            tracing::warn!(
                event_type = %event_type,
                kind = e.kind(),
                error = %e,
                "Rejecting webhook payload"
            );
            e
        })?;

        if let BillingAction::Ignore { reason } = action {
            tracing::info!(event_type = %event_type, reason = %reason, "Webhook acknowledged without changes");
            return Ok(WebhookOutcome::Ignored { event_type, reason });
        }

        // 4. Apply under the store deadline
        let writes = action.write_count();
        let email = action.email().map(ToString::to_string).unwrap_or_default();
        let reference = action.reference().map(str::to_string).unwrap_or_default();

        let result = match tokio::time::timeout(self.store_timeout, self.apply(action)).await {
            Ok(result) => result,
            Err(_) => Err(WebhookError::StoreTimeout(self.store_timeout.as_secs())),
        };

        match result {
            Ok(()) => {
                tracing::info!(
                    event_type = %event_type,
                    email = %email,
                    reference = %reference,
                    writes,
                    "Webhook applied"
                );
                Ok(WebhookOutcome::Applied { event_type, writes })
            }
            Err(e) => {
                tracing::error!(
                    event_type = %event_type,
                    email = %email,
                    reference = %reference,
                    kind = e.kind(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Webhook store write failed"
                );
                Err(e)
            }
        }
    }

    async fn apply(&self, action: BillingAction) -> Result<(), WebhookError> {
        match action {
            BillingAction::Upsert(upsert) => {
                self.store.upsert_subscription(&upsert).await?;
            }
            BillingAction::Update { email, patch } => {
                self.update(&email, &patch).await?;
            }
            BillingAction::ChargeSucceeded {
                email,
                patch,
                payment,
            } => {
                self.update(&email, &patch).await?;
                self.record(&payment).await?;
            }
            BillingAction::PaymentFailed {
                email,
                payment,
                patch,
            } => {
                self.record(&payment).await?;
                self.update(&email, &patch).await?;
            }
            BillingAction::Ignore { .. } => {}
        }
        Ok(())
    }

    async fn update(&self, email: &Email, patch: &SubscriptionPatch) -> Result<(), WebhookError> {
        let touched = self.store.update_subscription(email, patch).await?;
        if touched == 0 {
            tracing::warn!(email = %email, "No subscription row matched update; acknowledging");
        }
        Ok(())
    }

    async fn record(&self, payment: &PaymentEvent) -> Result<(), WebhookError> {
        if self.store.insert_payment_event(payment).await? == InsertOutcome::Duplicate {
            tracing::info!(
                email = %payment.email,
                reference = %payment.reference,
                "Payment event already recorded"
            );
        }
        Ok(())
    }
}
