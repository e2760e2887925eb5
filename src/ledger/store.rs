//! Append-only transaction store
//!
//! The durable record of all attempted transfers. Records are appended
//! once and never updated; reusing a transaction id is a storage-layer
//! error, not a business rule.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::models::Transaction;
use crate::store::StoreError;

/// Ledger consumed by the transfer engine.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Append a new immutable record. Fails only on storage-layer errors,
    /// including an attempt to reuse an existing id.
    async fn append(&self, transaction: Transaction) -> Result<(), StoreError>;

    /// Look up a record by transaction id. `Ok(None)` when absent.
    async fn find_by_id(&self, transaction_id: &str) -> Result<Option<Transaction>, StoreError>;
}

/// In-memory append-only ledger keyed by transaction id.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    entries: DashMap<String, Transaction>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all records, in no particular order.
    pub fn records(&self) -> Vec<Transaction> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn append(&self, transaction: Transaction) -> Result<(), StoreError> {
        match self
            .entries
            .entry(transaction.transaction_id.as_str().to_string())
        {
            Entry::Occupied(existing) => Err(StoreError::new(format!(
                "duplicate transaction id: {}",
                existing.key()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(transaction);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, transaction_id: &str) -> Result<Option<Transaction>, StoreError> {
        Ok(self.entries.get(transaction_id).map(|e| e.value().clone()))
    }
}
