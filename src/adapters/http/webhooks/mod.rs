//! HTTP adapter for provider webhooks.
//!
//! - `POST /paystack-webhook` - signed subscription event from the provider
//! - `OPTIONS /paystack-webhook` - CORS preflight

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, ReceivedResponse};
pub use handlers::{WebhookApiError, WebhookAppState, PAYSTACK_SIGNATURE_HEADER, SIGNATURE_HEADER};
pub use routes::webhook_routes;
