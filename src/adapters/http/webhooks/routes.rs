//! Axum router configuration for webhook endpoints.

use axum::{routing::post, Router};

use super::handlers::{handle_paystack_webhook, preflight, WebhookAppState};

/// Create the webhook router.
///
/// Webhooks carry no user authentication; every delivery is verified by
/// signature instead.
///
/// # Routes
/// - `POST /paystack-webhook` - Reconcile a provider event
/// - `OPTIONS /paystack-webhook` - CORS preflight
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route(
        "/paystack-webhook",
        post(handle_paystack_webhook).options(preflight),
    )
}
