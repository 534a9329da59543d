//! Provider webhook signature verification.
//!
//! The provider signs each delivery with `HMAC-SHA512(secret, raw_body)` and
//! sends the hex digest in a header. Verification always runs over the
//! exact bytes received; the body is parsed only after it passes.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

type HmacSha512 = Hmac<Sha512>;

/// Verifier for provider webhook signatures.
pub struct WebhookVerifier {
    /// Shared signing secret (the provider's secret key).
    secret: SecretString,
}

impl WebhookVerifier {
    /// Creates a verifier, or `None` when the secret is empty.
    pub fn new(secret: SecretString) -> Option<Self> {
        if secret.expose_secret().trim().is_empty() {
            return None;
        }
        Some(Self { secret })
    }

    /// Verifies `signature` (hex) against the raw request body.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - header absent or blank
    /// - `InvalidSignature` - not hex, or digest mismatch
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        let provided = hex::decode(signature).map_err(|_| WebhookError::InvalidSignature)?;
        let expected = self.compute_signature(payload)?;

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Hex-encoded signature for `payload`, as the provider would send it.
    pub fn sign(&self, payload: &[u8]) -> Result<String, WebhookError> {
        Ok(hex::encode(self.compute_signature(payload)?))
    }

    fn compute_signature(&self, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = HmacSha512::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::MissingSecret)?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
