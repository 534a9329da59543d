//! HTTP handlers for provider webhook deliveries.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    ProcessPaystackWebhookCommand, ProcessPaystackWebhookHandler,
};
use crate::domain::billing::WebhookError;

use super::dto::{ErrorResponse, ReceivedResponse};

/// Signature header this service documents.
pub const SIGNATURE_HEADER: &str = "x-provider-signature";

/// The provider's native header name, accepted as an alias.
pub const PAYSTACK_SIGNATURE_HEADER: &str = "x-paystack-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for webhook routes.
#[derive(Clone)]
pub struct WebhookAppState {
    pub handler: Arc<ProcessPaystackWebhookHandler>,
}

impl WebhookAppState {
    pub fn new(handler: ProcessPaystackWebhookHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /paystack-webhook - Reconcile one provider event
pub async fn handle_paystack_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let cmd = ProcessPaystackWebhookCommand {
        payload: body.to_vec(),
        signature: signature_from(&headers),
    };

    state.handler.handle(cmd).await?;

    Ok((StatusCode::OK, Json(ReceivedResponse::received())))
}

/// OPTIONS - CORS preflight; headers are added by the CORS layer
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

fn signature_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SIGNATURE_HEADER)
        .or_else(|| headers.get(PAYSTACK_SIGNATURE_HEADER))
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper for webhook errors.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl WebhookApiError {
    /// Message safe to return to the caller; store internals stay in logs.
    fn public_message(&self) -> String {
        match &self.0 {
            WebhookError::MissingSecret => "Server configuration error".to_string(),
            WebhookError::Store(_) | WebhookError::StoreTimeout(_) => {
                "Failed to process webhook".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn documented_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static("aa"));
        headers.insert(PAYSTACK_SIGNATURE_HEADER, HeaderValue::from_static("bb"));

        assert_eq!(signature_from(&headers).as_deref(), Some("aa"));
    }

    #[test]
    fn alias_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Paystack-Signature", HeaderValue::from_static("bb"));

        assert_eq!(signature_from(&headers).as_deref(), Some("bb"));
    }

    #[test]
    fn absent_header_yields_none() {
        assert!(signature_from(&HeaderMap::new()).is_none());
    }

    #[test]
    fn store_errors_hide_details() {
        let err = WebhookApiError(WebhookError::Store("connection refused to 10.0.0.5".to_string()));
        assert_eq!(err.public_message(), "Failed to process webhook");
    }

    #[test]
    fn client_errors_keep_details() {
        let err = WebhookApiError(WebhookError::MissingField("customer.email"));
        assert_eq!(err.public_message(), "Missing field: customer.email");
    }
}
