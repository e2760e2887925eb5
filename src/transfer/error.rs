//! Transfer error taxonomy
//!
//! Business-rule rejections are expected outcomes returned as values, so
//! callers can pattern-match without exception hierarchies. The
//! persistence kind is the only one a caller may retry; for it the engine
//! guarantees no partial state was left behind.

use std::fmt;

use thiserror::Error;

use crate::account::AccountStatus;
use crate::money::{Money, MoneyError};
use crate::store::StoreError;

/// Which side of the transfer an account-level error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSide {
    Source,
    Destination,
}

impl AccountSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountSide::Source => "Source",
            AccountSide::Destination => "Destination",
        }
    }
}

impl fmt::Display for AccountSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transfer error kinds.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    /// Amount missing, out of bounds, or wrong precision.
    #[error("{0}")]
    InvalidAmount(String),

    /// Malformed or missing UPI id, or source equals destination.
    #[error("{0}")]
    InvalidUpi(String),

    /// No account matches the identifier on the named side.
    #[error("{side} account not found: {upi_id}")]
    AccountNotFound { side: AccountSide, upi_id: String },

    /// The account exists but is not ACTIVE.
    #[error("{side} account is {status}: {upi_id}")]
    AccountNotActive {
        side: AccountSide,
        upi_id: String,
        status: AccountStatus,
    },

    /// Source balance is below amount plus fee.
    #[error("Insufficient balance. Available: {available}, Required: {required}")]
    InsufficientBalance { available: Money, required: Money },

    /// A store failed mid-commit after validations passed. The engine
    /// rolls back any balance mutation before surfacing this.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl TransferError {
    /// Stable error code for API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount(_) => "INVALID_AMOUNT",
            TransferError::InvalidUpi(_) => "INVALID_UPI",
            TransferError::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            TransferError::AccountNotActive { .. } => "ACCOUNT_NOT_ACTIVE",
            TransferError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            TransferError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Only persistence failures are worth retrying; every other kind
    /// needs different input from the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransferError::Persistence(_))
    }
}

impl From<StoreError> for TransferError {
    fn from(err: StoreError) -> Self {
        TransferError::Persistence(err.to_string())
    }
}

impl From<MoneyError> for TransferError {
    fn from(err: MoneyError) -> Self {
        TransferError::InvalidAmount(err.to_string())
    }
}
