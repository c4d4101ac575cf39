//! Money Representation Module
//!
//! All client-facing amounts and stored balances are `rust_decimal::Decimal`.
//! Binary floats never touch a balance. This module owns the strict
//! parse/serialize rules so every endpoint rejects the same malformed forms.
//!
//! ## Wire format
//! - Serialized as a JSON string to preserve precision ("30.50", not 30.5)
//! - Deserialized from either a JSON string or a JSON number
//! - Rejected at the serde layer: negatives, empty strings, `.5`, `5.`

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Money format errors
#[derive(Debug, Error)]
pub enum MoneyError {
    #[error("Amount cannot be negative")]
    Negative,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Format-validated, non-negative decimal amount.
///
/// Shape validation (negative, `.5`, `5.`, empty) happens during
/// deserialization; business validation (positivity, balance coverage)
/// happens later in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    /// Build from a Decimal, rejecting negative values.
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value.is_sign_negative() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(value))
    }

    /// Strict parse from a client string.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }
        if s.starts_with('.') {
            return Err(MoneyError::InvalidFormat(
                "missing leading zero (use 0.5, not .5)".into(),
            ));
        }
        if s.ends_with('.') {
            return Err(MoneyError::InvalidFormat(
                "missing fractional part (use 5.0, not 5.)".into(),
            ));
        }
        let d = Decimal::from_str(s).map_err(|e| MoneyError::InvalidFormat(e.to_string()))?;
        Self::new(d)
    }

    /// Get the inner Decimal value
    #[inline]
    pub fn inner(self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Positivity check used by the engine preconditions.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        // Support both JSON number and JSON string
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DecimalOrString {
            String(String),
            Number(Decimal),
        }

        match DecimalOrString::deserialize(deserializer)? {
            DecimalOrString::String(s) => Amount::parse(&s).map_err(D::Error::custom),
            DecimalOrString::Number(d) => Amount::new(d).map_err(D::Error::custom),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // String, to preserve precision
        serializer.serialize_str(&self.0.to_string())
    }
}

/// Serialize a raw Decimal field (stored balances) as a string.
pub fn decimal_as_str<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_valid_string() {
        let json = r#""1.5""#;
        let a: Amount = serde_json::from_str(json).unwrap();
        assert_eq!(a.inner(), Decimal::from_str("1.5").unwrap());
    }

    #[test]
    fn test_amount_valid_number() {
        let json = r#"1.5"#;
        let a: Amount = serde_json::from_str(json).unwrap();
        assert_eq!(a.inner(), Decimal::from_str("1.5").unwrap());
    }

    #[test]
    fn test_amount_rejects_dot_prefix() {
        let result: Result<Amount, _> = serde_json::from_str(r#"".5""#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("0.5"));
    }

    #[test]
    fn test_amount_rejects_dot_suffix() {
        let result: Result<Amount, _> = serde_json::from_str(r#""5.""#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("5.0"));
    }

    #[test]
    fn test_amount_rejects_negative_string() {
        let result: Result<Amount, _> = serde_json::from_str(r#""-1.5""#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("negative"));
    }

    #[test]
    fn test_amount_rejects_negative_number() {
        let result: Result<Amount, _> = serde_json::from_str(r#"-1.5"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_amount_rejects_empty() {
        let result: Result<Amount, _> = serde_json::from_str(r#""""#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_amount_serializes_as_string() {
        let a = Amount::parse("30.50").unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), r#""30.50""#);
    }

    #[test]
    fn test_zero_not_positive() {
        let a = Amount::parse("0").unwrap();
        assert!(a.is_zero());
        assert!(!a.is_positive());
    }
}
