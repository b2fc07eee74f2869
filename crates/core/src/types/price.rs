//! Type-safe price representation using decimal arithmetic.
//!
//! Prices never pass through floating point. They are parsed from their
//! textual form, stored as `NUMERIC`, and serialized back to JSON as a
//! string so that `"19.99"` reads back as `"19.99"`.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a representable decimal number.
    #[error("invalid price {input:?}: {reason}")]
    Invalid {
        /// The rejected input.
        input: String,
        /// Why the decimal parser rejected it.
        reason: String,
    },
}

/// An exact decimal price.
///
/// ```
/// use storekeep_core::Price;
///
/// let price = Price::parse("19.99").unwrap();
/// assert_eq!(price.to_string(), "19.99");
///
/// assert!(Price::parse("").is_err());
/// assert!(Price::parse("abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse a price from its textual form without rounding.
    ///
    /// Plain notation (`"19.99"`) and scientific notation (`"1.5e2"`) are
    /// accepted. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not a number, or has more
    /// precision than a `Decimal` can hold exactly.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let parsed = if trimmed.contains(['e', 'E']) {
            Decimal::from_scientific(trimmed)
        } else {
            Decimal::from_str_exact(trimmed)
        };

        parsed.map(Self).map_err(|e| PriceError::Invalid {
            input: trimmed.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_exact_scale() {
        assert_eq!(Price::parse("19.99").unwrap().to_string(), "19.99");
        assert_eq!(Price::parse("20.10").unwrap().to_string(), "20.10");
        assert_eq!(Price::parse("  5 ").unwrap().to_string(), "5");
    }

    #[test]
    fn test_parse_has_no_float_drift() {
        let a = Price::parse("0.1").unwrap().amount();
        let b = Price::parse("0.2").unwrap().amount();
        assert_eq!((a + b).to_string(), "0.3");
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(Price::parse("1.5e2").unwrap().amount(), Decimal::new(150, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Price::parse("   "), Err(PriceError::Empty));
        assert!(matches!(
            Price::parse("12,50"),
            Err(PriceError::Invalid { .. })
        ));
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::parse("19.99").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"19.99\"");
    }
}
