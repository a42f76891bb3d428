use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const CURRENCY_CODE: &str = "KES";

//--------------------------------------       Amount        ---------------------------------------------------------
/// A currency value held as a whole number of cents.
///
/// The provider reports amounts and balances as decimal numbers in major units (e.g. `10.5`); these are converted
/// with [`Amount::from_major_units`], which rounds to the nearest cent.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Amount(i64);

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Value cannot be represented as an amount: {0}")]
pub struct AmountConversionError(String);

impl From<i64> for Amount {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02} {CURRENCY_CODE}", abs / 100, abs % 100)
    }
}

impl Amount {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_major_units(value: f64) -> Result<Self, AmountConversionError> {
        if !value.is_finite() {
            return Err(AmountConversionError(format!("{value} is not a finite number")));
        }
        let cents = (value * 100.0).round();
        if cents > i64::MAX as f64 || cents < i64::MIN as f64 {
            return Err(AmountConversionError(format!("{value} is out of range")));
        }
        #[allow(clippy::cast_possible_truncation)]
        let cents = cents as i64;
        Ok(Self(cents))
    }

    pub fn as_major_units(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}
