//! Billing command handlers.

mod process_paystack_webhook;

pub use process_paystack_webhook::{
    ProcessPaystackWebhookCommand, ProcessPaystackWebhookHandler, WebhookOutcome,
};
