//! Fixed-point money representation
//!
//! All monetary amounts are stored as `i64` minor units (paise) with a
//! fixed scale of 2. Arithmetic is exact and checked. Binary floating
//! point never touches a balance; `rust_decimal::Decimal` is accepted only
//! at the API boundary and converted here.
//!
//! ## Format Rules (parsing)
//! - At most 2 fractional digits, no silent truncation
//! - No sign prefix (amounts are non-negative by construction)
//! - Rejects `.5`, `5.`, scientific notation, empty strings

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed number of fractional digits.
pub const SCALE: u32 = 2;

const MINOR_PER_MAJOR: i64 = 100;

// ============================================================================
// Error Types
// ============================================================================

/// Money construction/conversion errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount cannot have more than 2 decimal places")]
    PrecisionOverflow,

    #[error("Amount cannot be negative")]
    Negative,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Money
// ============================================================================

/// An exact monetary amount in minor units (scale 2).
///
/// `Copy`, totally ordered, and immutable: every operation returns a new
/// value. Negative values are representable (subtraction results, signed
/// deltas) but cannot be produced by parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from minor units (paise). `from_minor(12345)` == 123.45.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Construct from whole currency units. `from_major(5)` == 5.00.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Raw minor-unit value.
    #[inline]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Exact addition. Errors on i64 overflow.
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Exact subtraction. Errors on i64 overflow; the result may be
    /// negative.
    pub fn checked_sub(self, other: Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Parse a strict decimal string into minor units.
    ///
    /// # Errors
    /// * `Negative` - on a `-` prefix
    /// * `PrecisionOverflow` - more than 2 fractional digits
    /// * `Overflow` - value does not fit in i64 minor units
    /// * `InvalidFormat` - anything else that is not a plain decimal
    pub fn parse(input: &str) -> Result<Money, MoneyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(MoneyError::InvalidFormat("empty string".into()));
        }
        if input.starts_with('-') {
            return Err(MoneyError::Negative);
        }
        if input.starts_with('+') {
            return Err(MoneyError::InvalidFormat("+ prefix not allowed".into()));
        }
        if input.contains('e') || input.contains('E') {
            return Err(MoneyError::InvalidFormat(
                "scientific notation not allowed".into(),
            ));
        }

        let parts: Vec<&str> = input.split('.').collect();
        let (whole, frac) = match parts.len() {
            1 => (parts[0], ""),
            2 => {
                // Require both sides of the dot: rejects ".5" and "5."
                if parts[0].is_empty() {
                    return Err(MoneyError::InvalidFormat(
                        "missing leading zero (use 0.5 instead of .5)".into(),
                    ));
                }
                if parts[1].is_empty() {
                    return Err(MoneyError::InvalidFormat(
                        "missing fractional part (use 5.0 instead of 5.)".into(),
                    ));
                }
                (parts[0], parts[1])
            }
            _ => return Err(MoneyError::InvalidFormat("multiple decimal points".into())),
        };

        if frac.len() > SCALE as usize {
            return Err(MoneyError::PrecisionOverflow);
        }

        let whole_num: i64 = whole.parse().map_err(|_| {
            if whole.chars().all(|c| c.is_ascii_digit()) {
                MoneyError::Overflow
            } else {
                MoneyError::InvalidFormat(format!("invalid character in whole part: {}", whole))
            }
        })?;

        let frac_num: i64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = SCALE as usize);
            padded
                .parse()
                .map_err(|_| MoneyError::InvalidFormat("invalid fractional part".into()))?
        };

        whole_num
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|v| v.checked_add(frac_num))
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Convert from a `Decimal` at the API boundary.
    pub fn from_decimal(value: Decimal) -> Result<Money, MoneyError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MoneyError::Negative);
        }
        let scaled = value * Decimal::from(MINOR_PER_MAJOR);
        if !scaled.fract().is_zero() {
            return Err(MoneyError::PrecisionOverflow);
        }
        scaled.to_i64().map(Money).ok_or(MoneyError::Overflow)
    }

    /// Exact `Decimal` value at scale 2.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            abs / MINOR_PER_MAJOR as u64,
            abs % MINOR_PER_MAJOR as u64
        )
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

// Serde: always a string, strict on the way in. JSON numbers would bypass
// the format rules, so they are rejected.
impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let s = String::deserialize(deserializer)?;
        Money::parse(&s).map_err(D::Error::custom)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
