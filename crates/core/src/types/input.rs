//! Lenient request input.
//!
//! Clients send ids either as JSON integers or as numeric strings, and prices
//! either as JSON numbers or as decimal strings. These types accept both
//! shapes at deserialization time and defer the actual coercion to the
//! handler, where a failed coercion is reported like any other failure of
//! the operation.

use serde::Deserialize;

use super::price::{Price, PriceError};

/// Errors that can occur while coercing lenient input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoerceError {
    /// The value is not an integer.
    #[error("invalid id {0:?}: expected an integer")]
    InvalidId(String),
    /// The value is an integer but does not fit an id column.
    #[error("id {0} is out of range")]
    IdOutOfRange(String),
    /// The value is not an exact decimal.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// An id as sent by a client: `7` or `"7"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    /// A JSON integer.
    Int(i64),
    /// A JSON string, expected to hold a decimal integer.
    Text(String),
}

impl LooseId {
    /// Whether the value counts as "set" for a partial update.
    ///
    /// Zero and the empty string do not.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(n) => *n != 0,
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Keep the value only if it is truthy.
    #[must_use]
    pub fn truthy(value: Option<Self>) -> Option<Self> {
        value.filter(Self::is_truthy)
    }

    /// Coerce into a typed id.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an integer or does not fit `i32`.
    pub fn resolve<T: From<i32>>(&self) -> Result<T, CoerceError> {
        match self {
            Self::Int(n) => i32::try_from(*n)
                .map(T::from)
                .map_err(|_| CoerceError::IdOutOfRange(n.to_string())),
            Self::Text(s) => parse_id(s),
        }
    }
}

/// Parse a decimal id string such as a path segment.
///
/// # Errors
///
/// Returns an error if the string is not a plain decimal integer (`"1.0"`
/// and `"1e2"` are rejected) or does not fit `i32`.
pub fn parse_id<T: From<i32>>(raw: &str) -> Result<T, CoerceError> {
    let trimmed = raw.trim();
    let wide: i64 = trimmed
        .parse()
        .map_err(|_| CoerceError::InvalidId(raw.to_owned()))?;
    i32::try_from(wide)
        .map(T::from)
        .map_err(|_| CoerceError::IdOutOfRange(trimmed.to_owned()))
}

/// Keep a text field only if it is non-empty.
#[must_use]
pub fn truthy_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// A price as sent by a client: `19.99` or `"19.99"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LoosePrice {
    /// A JSON number, taken by its shortest textual form.
    Number(serde_json::Number),
    /// A JSON string holding a decimal.
    Text(String),
}

impl LoosePrice {
    /// Coerce into an exact [`Price`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a representable decimal.
    pub fn resolve(&self) -> Result<Price, CoerceError> {
        let price = match self {
            Self::Number(n) => Price::parse(&n.to_string())?,
            Self::Text(s) => Price::parse(s)?,
        };
        Ok(price)
    }
}
