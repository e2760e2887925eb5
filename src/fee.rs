//! Transfer fee policy
//!
//! Flat-fee schedule: amounts at or below the threshold move free of
//! charge, amounts above it pay a flat fee. The fee is retained by the
//! system; it is never credited to the destination.

use crate::money::Money;

/// Amounts at or below this threshold incur no fee (1000.00).
pub const FEE_THRESHOLD: Money = Money::from_minor(100_000);

/// Flat fee applied above the threshold (5.00).
pub const FLAT_FEE: Money = Money::from_minor(500);

/// Pure, stateless fee schedule.
///
/// Deterministic and total over valid amounts: repeated calls with the
/// same input always yield the same fee.
#[derive(Debug, Clone, Copy)]
pub struct FeePolicy {
    threshold: Money,
    flat_fee: Money,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::new(FEE_THRESHOLD, FLAT_FEE)
    }
}

impl FeePolicy {
    pub fn new(threshold: Money, flat_fee: Money) -> Self {
        Self { threshold, flat_fee }
    }

    /// Fee for a transfer of `amount`. Boundary exact: the threshold
    /// itself is free, one paisa above it pays the flat fee.
    #[inline]
    pub fn fee_for(&self, amount: Money) -> Money {
        if amount > self.threshold {
            self.flat_fee
        } else {
            Money::ZERO
        }
    }
}
