//! Best-effort numeric coercion of captured metric values.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// A metric value: an integer when the text allows it, otherwise a float.
///
/// NaN is never produced; parsing `"nan"` fails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Numeric {
    /// Integral value.
    Int(i64),
    /// Non-integral, non-finite or out-of-range value.
    Float(f64),
}

/// The text did not have a straightforward numeric conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not numeric: {0}")]
pub struct ParseNumericError(String);

// Largest magnitude below which every integral f64 converts to i64 exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl FromStr for Numeric {
    type Err = ParseNumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let not_numeric = || ParseNumericError(s.to_string());

        if let Some(percent) = text.strip_suffix('%') {
            let value: f64 = percent.trim_end().parse().map_err(|_| not_numeric())?;
            if value.is_nan() {
                return Err(not_numeric());
            }
            return Ok(Numeric::Float(value / 100.0));
        }

        if let Ok(value) = text.parse::<i64>() {
            return Ok(Numeric::Int(value));
        }

        let value: f64 = text.parse().map_err(|_| not_numeric())?;
        if value.is_nan() {
            return Err(not_numeric());
        }
        if value.is_finite() && value.fract() == 0.0 && value.abs() < I64_BOUND {
            Ok(Numeric::Int(value as i64))
        } else {
            Ok(Numeric::Float(value))
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Int(v) => write!(f, "{v}"),
            Numeric::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Int(value)
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Float(value)
    }
}
