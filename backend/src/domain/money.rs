//! Monetary Values
//!
//! Fixed-point decimal amounts with two fractional digits. User input is
//! normalized at the boundary (either `.` or `,` accepted as the decimal
//! separator); the stored value of record is always the canonical decimal
//! form, never a display-formatted string.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use super::entity::{DomainError, DomainResult};

/// A decimal monetary amount, kept at two fractional digits.
///
/// Item values are positive; totals and deltas may carry any sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Parse user input into a canonical amount.
    ///
    /// Accepts `,` as an alternative decimal separator ("12,50" == "12.50").
    /// Rejects empty input, mixed separators and anything that is not a
    /// plain decimal number. Rounds to two fractional digits.
    pub fn parse(input: &str) -> DomainResult<Money> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::Validation("value is required".to_string()));
        }
        if trimmed.contains(',') && trimmed.contains('.') {
            return Err(DomainError::Validation(format!(
                "mixed decimal separators in value: {}",
                trimmed
            )));
        }
        let normalized = trimmed.replace(',', ".");
        let amount = Decimal::from_str(&normalized)
            .map_err(|_| DomainError::Validation(format!("not a valid number: {}", trimmed)))?;
        Ok(Money(
            amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        ))
    }

    pub fn plus(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }

    pub fn minus(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }

    pub fn negated(self) -> Money {
        Money(-self.0)
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// Stored as the canonical two-digit string ("12.50"), not a JSON float.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Decimal::from_str(&raw)
            .map(Money)
            .map_err(|_| D::Error::custom(format!("invalid monetary amount: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dot_separator() {
        let m = Money::parse("12.50").unwrap();
        assert_eq!(m.to_string(), "12.50");
    }

    #[test]
    fn test_parse_comma_separator() {
        let m = Money::parse("12,50").unwrap();
        assert_eq!(m, Money::parse("12.50").unwrap());
        assert_eq!(m.to_string(), "12.50");
    }

    #[test]
    fn test_parse_whole_number_displays_two_digits() {
        let m = Money::parse("10").unwrap();
        assert_eq!(m.to_string(), "10.00");
    }

    #[test]
    fn test_parse_rounds_to_two_digits() {
        assert_eq!(Money::parse("1.005").unwrap().to_string(), "1.01");
        assert_eq!(Money::parse("2.444").unwrap().to_string(), "2.44");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("   ").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("1.234,56").is_err());
    }

    #[test]
    fn test_parse_keeps_sign() {
        let m = Money::parse("-5").unwrap();
        assert!(!m.is_positive());
        assert!(!Money::parse("0").unwrap().is_positive());
        assert!(Money::parse("0.01").unwrap().is_positive());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::parse("10.00").unwrap();
        let b = Money::parse("5.50").unwrap();
        assert_eq!(a.plus(b).to_string(), "15.50");
        assert_eq!(b.minus(a).to_string(), "-4.50");
        assert_eq!(a.minus(a), Money::ZERO);
        assert_eq!(a.negated().plus(a), Money::ZERO);
    }

    #[test]
    fn test_serde_round_trip() {
        let m = Money::parse("12,50").unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"12.50\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
