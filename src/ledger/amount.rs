//! Permissive numeric coercion for amounts arriving from callers.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected input for an entry, budget, or stats update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Amount as supplied at the boundary: a number or arbitrary text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(Decimal),
    Text(String),
}

impl RawAmount {
    /// Coerces to a decimal. Empty or non-numeric text becomes zero.
    pub fn coerce(&self) -> Decimal {
        match self {
            RawAmount::Number(value) => *value,
            RawAmount::Text(text) => {
                let text = text.trim();
                Decimal::from_str(text)
                    .or_else(|_| Decimal::from_scientific(text))
                    .unwrap_or(Decimal::ZERO)
            }
        }
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        RawAmount::Number(value)
    }
}

/// NaN, infinities and values outside the decimal range coerce to zero.
impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        Decimal::try_from(value)
            .map(RawAmount::Number)
            .unwrap_or_else(|_| RawAmount::Text(value.to_string()))
    }
}

impl From<u32> for RawAmount {
    fn from(value: u32) -> Self {
        RawAmount::Number(Decimal::from(value))
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

impl From<String> for RawAmount {
    fn from(value: String) -> Self {
        RawAmount::Text(value)
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Number(value) => write!(f, "{value}"),
            RawAmount::Text(text) => f.write_str(text),
        }
    }
}

/// Coerces an optional raw amount and rejects negative magnitudes.
pub fn non_negative(raw: Option<&RawAmount>, field: &str) -> Result<Decimal, ValidationError> {
    let value = raw.map(RawAmount::coerce).unwrap_or(Decimal::ZERO);
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new(format!(
            "{field} must not be negative (got {value})"
        )));
    }
    Ok(value)
}
