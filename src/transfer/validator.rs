//! Transfer request validation
//!
//! Pure, deterministic checks in a fixed order so callers always see the
//! same error for the same input: required ids, id format, self-transfer,
//! then amount presence and bounds. Runs before any store access.

use super::error::{AccountSide, TransferError};
use crate::money::Money;

/// Minimum transfer amount (1.00).
pub const MIN_AMOUNT: Money = Money::from_minor(100);

/// Maximum per-transaction amount (100,000.00).
pub const MAX_AMOUNT: Money = Money::from_minor(10_000_000);

/// Stateless validator for transfer requests.
#[derive(Debug, Clone, Copy)]
pub struct TransferValidator {
    min_amount: Money,
    max_amount: Money,
}

impl Default for TransferValidator {
    fn default() -> Self {
        Self::new(MIN_AMOUNT, MAX_AMOUNT)
    }
}

impl TransferValidator {
    pub fn new(min_amount: Money, max_amount: Money) -> Self {
        Self {
            min_amount,
            max_amount,
        }
    }

    /// Validate a complete transfer request.
    ///
    /// Check order is fixed: source required, destination required,
    /// source format, destination format, same-account, amount required,
    /// minimum, maximum.
    pub fn validate(
        &self,
        source_upi: &str,
        destination_upi: &str,
        amount: Option<Money>,
    ) -> Result<(), TransferError> {
        require_upi(source_upi, AccountSide::Source)?;
        require_upi(destination_upi, AccountSide::Destination)?;
        check_format(source_upi)?;
        check_format(destination_upi)?;

        if source_upi == destination_upi {
            return Err(TransferError::InvalidUpi(
                "Cannot transfer to the same account".to_string(),
            ));
        }

        let amount =
            amount.ok_or_else(|| TransferError::InvalidAmount("Amount is required".to_string()))?;
        if amount < self.min_amount {
            return Err(TransferError::InvalidAmount(format!(
                "Minimum transfer amount is {}",
                self.min_amount
            )));
        }
        if amount > self.max_amount {
            return Err(TransferError::InvalidAmount(format!(
                "Maximum per-transaction limit is {}",
                self.max_amount
            )));
        }

        Ok(())
    }
}

fn require_upi(upi_id: &str, side: AccountSide) -> Result<(), TransferError> {
    if upi_id.trim().is_empty() {
        return Err(TransferError::InvalidUpi(format!(
            "{} UPI ID is required",
            side
        )));
    }
    Ok(())
}

fn check_format(upi_id: &str) -> Result<(), TransferError> {
    if !is_well_formed_upi(upi_id) {
        return Err(TransferError::InvalidUpi(format!(
            "Invalid UPI ID format: {}",
            upi_id
        )));
    }
    Ok(())
}

/// `localpart@handle`: non-empty local part of alphanumerics and `.`,
/// `-`, `_`; non-empty alphabetic handle.
pub fn is_well_formed_upi(upi_id: &str) -> bool {
    let Some((local, handle)) = upi_id.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        && !handle.is_empty()
        && handle.chars().all(|c| c.is_ascii_alphabetic())
}
