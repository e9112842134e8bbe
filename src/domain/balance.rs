//! Numeric account balance.
//!
//! [`Balance`] wraps an `f64` and serializes integral values as JSON
//! integers, so a balance of 42 goes over the wire as `42` rather than
//! `42.0`. Fractional values keep their float representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest integer an `f64` represents exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Account balance as returned by a [`super::BalanceResolver`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Balance(f64);

impl Balance {
    /// Wraps a raw balance value.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw balance value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Returns `true` if the balance has no fractional part and fits in an
    /// `i64` without loss.
    #[must_use]
    pub fn is_integral(self) -> bool {
        self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() <= MAX_EXACT_INTEGER
    }
}

impl From<f64> for Balance {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i64> for Balance {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a balance string is not a finite number.
#[derive(Debug, thiserror::Error)]
#[error("invalid balance: {0}")]
pub struct ParseBalanceError(String);

impl FromStr for Balance {
    type Err = ParseBalanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| ParseBalanceError(s.to_string()))?;
        if !value.is_finite() {
            return Err(ParseBalanceError(s.to_string()));
        }
        Ok(Self(value))
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_integral() {
            #[allow(clippy::cast_possible_truncation)]
            let whole = self.0 as i64;
            serializer.serialize_i64(whole)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Balance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self)
    }
}
