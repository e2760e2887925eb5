//! Ledger record types
//!
//! Every transfer attempt that reaches the ledger is recorded exactly
//! once and never mutated afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Maximum stored length of the free-text remarks field, in characters.
pub const MAX_REMARKS_CHARS: usize = 255;

/// Unique transaction identifier: `TXN-<yyyymmddhhmmss>-<4-digit suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Mint a new id.
    ///
    /// The suffix comes from the OS entropy source. The caller is
    /// responsible for retrying on the (negligible) chance of a collision
    /// with an already-persisted id.
    pub fn generate() -> Self {
        let timestamp = Utc::now().format("%Y%m%d%H%M%S");
        let suffix: u32 = OsRng.gen_range(0..10_000);
        Self(format!("TXN-{}-{:04}", timestamp, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome recorded for one transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable record of one transfer attempt.
///
/// References the two accounts by UPI id only; no ownership. Accounts may
/// be archived independently and the record stays valid history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub source_upi: String,
    pub destination_upi: String,
    pub amount: Money,
    pub fee: Money,
    pub total_debited: Money,
    pub status: TransactionStatus,
    pub failure_reason: Option<String>,
    pub remarks: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Bound remarks to [`MAX_REMARKS_CHARS`] characters.
pub fn bounded_remarks(remarks: Option<&str>) -> Option<String> {
    remarks.map(|r| r.chars().take(MAX_REMARKS_CHARS).collect())
}
