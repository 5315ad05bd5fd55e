//! Lenient scalar values as they arrive from indexers.
//!
//! Subgraph-style APIs serialize `BigInt`/`BigDecimal` fields as JSON strings,
//! while REST services send plain numbers. Both shapes are accepted here and
//! validated into typed values at the record boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawNumber::Number(n) => write!(f, "{}", n),
            RawNumber::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RawNumber {
    fn from(value: i64) -> Self {
        RawNumber::Number(value.into())
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

impl RawNumber {
    /// Parses the value as a decimal. Scientific notation is accepted.
    pub fn to_decimal(&self, field: &str) -> Result<Decimal, ValidationError> {
        let text = self.to_string();
        let trimmed = text.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| ValidationError::InvalidNumber {
                field: field.to_string(),
                value: text.clone(),
            })
    }

    /// Parses the value as UNIX seconds. Fractional seconds are truncated;
    /// `NaN`, infinities and non-numeric text are rejected.
    pub fn to_timestamp(&self) -> Result<i64, ValidationError> {
        let text = self.to_string();
        let trimmed = text.trim();
        if let Ok(seconds) = trimmed.parse::<i64>() {
            return Ok(seconds);
        }
        match trimmed.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds.abs() < i64::MAX as f64 => {
                Ok(seconds.trunc() as i64)
            }
            _ => Err(ValidationError::InvalidTimestamp(text.clone())),
        }
    }
}

/// Converts a required raw field, reporting which field was missing.
pub fn required_decimal(
    value: Option<&RawNumber>,
    field: &str,
) -> Result<Decimal, ValidationError> {
    value
        .ok_or_else(|| ValidationError::MissingField(field.to_string()))?
        .to_decimal(field)
}

/// Converts an optional raw field. Present-but-malformed is still an error.
pub fn optional_decimal(
    value: Option<&RawNumber>,
    field: &str,
) -> Result<Option<Decimal>, ValidationError> {
    value.map(|v| v.to_decimal(field)).transpose()
}

pub fn required_timestamp(value: Option<&RawNumber>) -> Result<i64, ValidationError> {
    value
        .ok_or_else(|| ValidationError::MissingField("timestamp".to_string()))?
        .to_timestamp()
}
