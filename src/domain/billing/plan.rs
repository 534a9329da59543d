//! Product tiers sold on the marketing site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Named pricing tier, chosen by the customer at checkout and echoed back
/// by the provider in the `plan_type` custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Starter,
    Pro,
    Enterprise,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Starter => "starter",
            PlanType::Pro => "pro",
            PlanType::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starter" => Ok(PlanType::Starter),
            "pro" => Ok(PlanType::Pro),
            "enterprise" => Ok(PlanType::Enterprise),
            other => Err(ValidationError::invalid_format(
                "plan_type",
                format!("unknown plan type '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("pro".parse::<PlanType>().unwrap(), PlanType::Pro);
        assert_eq!(" Starter ".parse::<PlanType>().unwrap(), PlanType::Starter);
        assert_eq!("ENTERPRISE".parse::<PlanType>().unwrap(), PlanType::Enterprise);
    }

    #[test]
    fn rejects_unknown_tier() {
        assert!("platinum".parse::<PlanType>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PlanType::Pro).unwrap(), "\"pro\"");
    }
}
