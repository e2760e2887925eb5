//! Ledger - the append-only transaction record
//!
//! One immutable [`Transaction`] per completed or failed transfer
//! attempt, keyed by a unique `TXN-…` identifier.

pub mod models;
pub mod store;

pub use models::{
    MAX_REMARKS_CHARS, Transaction, TransactionId, TransactionStatus, bounded_remarks,
};
pub use store::{InMemoryTransactionStore, TransactionStore};
