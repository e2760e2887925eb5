//! Transfer request and result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{Transaction, TransactionId, TransactionStatus};
use crate::money::Money;

/// One request to move money between two accounts.
///
/// Ephemeral: validated once per attempt, never persisted. The amount is
/// optional at this layer so a missing field surfaces as a validation
/// error instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source_upi: String,
    pub destination_upi: String,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl TransferRequest {
    pub fn new(
        source_upi: impl Into<String>,
        destination_upi: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            source_upi: source_upi.into(),
            destination_upi: destination_upi.into(),
            amount: Some(amount),
            remarks: None,
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}

/// Outcome of a successful transfer, built from the ledger record.
#[derive(Debug, Clone, Serialize)]
pub struct TransferResult {
    pub transaction_id: TransactionId,
    pub status: TransactionStatus,
    pub source_upi: String,
    pub destination_upi: String,
    pub amount: Money,
    pub fee: Money,
    pub total_debited: Money,
    pub timestamp: DateTime<Utc>,
    pub remarks: Option<String>,
}

impl From<Transaction> for TransferResult {
    fn from(record: Transaction) -> Self {
        Self {
            transaction_id: record.transaction_id,
            status: record.status,
            source_upi: record.source_upi,
            destination_upi: record.destination_upi,
            amount: record.amount,
            fee: record.fee,
            total_debited: record.total_debited,
            timestamp: record.timestamp,
            remarks: record.remarks,
        }
    }
}
