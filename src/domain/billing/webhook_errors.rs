//! Webhook error types for payment-provider webhook handling.
//!
//! Defines all error conditions that can occur during webhook processing,
//! with HTTP status code mapping and retryability semantics. The provider
//! retries on any non-2xx response, so the status code is the contract.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No signing secret is configured; nothing can be verified.
    #[error("Webhook signing secret is not configured")]
    MissingSecret,

    /// Request carried no signature header.
    #[error("Missing signature")]
    MissingSignature,

    /// Signature did not match the body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body is not JSON or lacks the `event`/`data` envelope.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Required field missing from a recognized event.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Store rejected or failed a write.
    #[error("Store error: {0}")]
    Store(String),

    /// Store interaction exceeded the per-delivery deadline.
    #[error("Store operation timed out after {0}s")]
    StoreTimeout(u64),
}

impl WebhookError {
    /// Returns true if the provider redelivering this webhook may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Store(_) | WebhookError::StoreTimeout(_))
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// - 401: authentication failed, investigate before retrying
    /// - 400: payload will never succeed as sent
    /// - 500: configuration or store failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }

            WebhookError::MalformedPayload(_) | WebhookError::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }

            WebhookError::MissingSecret
            | WebhookError::Store(_)
            | WebhookError::StoreTimeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Taxonomy label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::MissingSecret => "configuration",
            WebhookError::MissingSignature | WebhookError::InvalidSignature => "authentication",
            WebhookError::MalformedPayload(_) | WebhookError::MissingField(_) => {
                "malformed_payload"
            }
            WebhookError::Store(_) | WebhookError::StoreTimeout(_) => "store",
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Store(err.to_string())
    }
}
