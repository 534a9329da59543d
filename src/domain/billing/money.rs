//! Provider amounts and their exact conversion to major currency units.
//!
//! The provider reports every amount in minor units (kobo, cents). Stored
//! amounts are major units with two decimal places, computed with
//! `rust_decimal` so that `9999900` becomes exactly `99999.00`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of minor units per major unit, as a decimal scale.
const MINOR_UNIT_SCALE: u32 = 2;

/// A non-negative amount in minor currency units as sent by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinorUnits(i64);

impl MinorUnits {
    /// Wraps a raw minor-unit count. Negative amounts are rejected.
    pub fn new(value: i64) -> Option<Self> {
        (value >= 0).then_some(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts to major units without rounding: `minor / 100`, scale 2.
    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, MINOR_UNIT_SCALE)
    }
}

impl Serialize for MinorUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

/// Accepted wire shapes: JSON integers, and integers rendered as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for MinorUnits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let raw = match RawAmount::deserialize(deserializer)? {
            RawAmount::Integer(value) => value,
            RawAmount::Float(value) => {
                return Err(D::Error::custom(format!(
                    "amount must be an integral number of minor units, got {}",
                    value
                )))
            }
            RawAmount::Text(text) => text.trim().parse::<i64>().map_err(|_| {
                D::Error::custom(format!("amount '{}' is not an integer", text))
            })?,
        };

        MinorUnits::new(raw)
            .ok_or_else(|| D::Error::custom(format!("amount must not be negative, got {}", raw)))
    }
}
