//! Response bodies for the webhook endpoint.

use serde::{Deserialize, Serialize};

/// Acknowledgement returned on every 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedResponse {
    pub received: bool,
}

impl ReceivedResponse {
    pub fn received() -> Self {
        Self { received: true }
    }
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn received_serializes_as_flag() {
        let json = serde_json::to_string(&ReceivedResponse::received()).unwrap();
        assert_eq!(json, r#"{"received":true}"#);
    }

    #[test]
    fn error_serializes_message() {
        let json = serde_json::to_string(&ErrorResponse::new("Invalid signature")).unwrap();
        assert_eq!(json, r#"{"error":"Invalid signature"}"#);
    }
}
