//! Payment provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Provider secret key used to sign webhook deliveries
    pub webhook_secret: Option<SecretString>,

    /// Currency recorded when a failure event omits one
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_secret = self
            .webhook_secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().trim().is_empty());
        if !has_secret {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }

        let currency = self.default_currency.as_str();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            default_currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "NGN".to_string()
}
