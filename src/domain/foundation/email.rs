//! Normalized email address, the key of every subscription row.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ValidationError;

/// Lower-cased, trimmed email address.
///
/// Two deliveries that spell the same address differently (`Jane@X.com`,
/// ` jane@x.com`) resolve to the same `Email` and therefore the same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalizes and validates an address.
    ///
    /// Only structural checks are made (non-empty, one `@` with text on
    /// both sides); the provider has already validated deliverability.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }

        match normalized.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(normalized))
            }
            _ => Err(ValidationError::invalid_format(
                "email",
                "expected exactly one '@' with text on both sides",
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercases_and_trims() {
        let email = Email::parse("  Jane@X.com ").unwrap();
        assert_eq!(email.as_str(), "jane@x.com");
    }

    #[test]
    fn differently_cased_addresses_are_equal() {
        assert_eq!(
            Email::parse("OWNER@Diner.NG").unwrap(),
            Email::parse("owner@diner.ng").unwrap()
        );
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(
            Email::parse("   "),
            Err(ValidationError::empty_field("email"))
        );
    }

    #[test]
    fn parse_rejects_missing_at() {
        assert!(matches!(
            Email::parse("jane.x.com"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn parse_rejects_double_at() {
        assert!(Email::parse("a@b@c").is_err());
        assert!(Email::parse("@x.com").is_err());
        assert!(Email::parse("jane@").is_err());
    }

    #[test]
    fn deserializes_through_normalization() {
        let email: Email = serde_json::from_str("\"Jane@X.com\"").unwrap();
        assert_eq!(email.to_string(), "jane@x.com");
    }
}
