//! Fixed-point decimal for order volumes and prices
//!
//! Kuna signs the literal text of every parameter, so an amount must render
//! exactly as the caller wrote it: `1.0` stays `1.0`, `15000` stays `15000`.
//! [`Fixed`] wraps [`rust_decimal::Decimal`], which keeps the scale it was
//! parsed with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Exact decimal value with preserved scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed {
    value: Decimal,
}

impl Fixed {
    pub const ZERO: Fixed = Fixed {
        value: Decimal::ZERO,
    };

    pub const ONE: Fixed = Fixed {
        value: Decimal::ONE,
    };

    pub fn from_decimal(value: Decimal) -> Self {
        Fixed { value }
    }

    /// Create a Fixed from an integer (scale 0)
    pub fn from_i64(value: i64) -> Self {
        Fixed {
            value: Decimal::from(value),
        }
    }

    /// Parse a decimal string, keeping its scale
    pub fn from_str_exact(s: &str) -> Result<Self, FixedError> {
        let decimal = Decimal::from_str(s.trim()).map_err(|_| FixedError::InvalidValue)?;
        Ok(Self::from_decimal(decimal))
    }

    pub fn to_decimal(&self) -> Decimal {
        self.value
    }

    /// Number of digits after the decimal point
    pub fn scale(&self) -> u32 {
        self.value.scale()
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixedError {
    #[error("Invalid decimal value")]
    InvalidValue,
}

impl Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for Fixed {
    type Err = FixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl From<Decimal> for Fixed {
    fn from(value: Decimal) -> Self {
        Fixed { value }
    }
}

impl From<Fixed> for Decimal {
    fn from(fixed: Fixed) -> Self {
        fixed.value
    }
}

impl From<i64> for Fixed {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

/// Convenience macro for creating Fixed values from literals
#[macro_export]
macro_rules! fixed {
    ($value:expr) => {
        $crate::fixed::Fixed::from_str_exact(stringify!($value)).unwrap()
    };
}
