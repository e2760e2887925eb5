//! Shared storage-layer error type
//!
//! Both stores (accounts and ledger) fail only for storage reasons;
//! business rules never produce a `StoreError`.

use thiserror::Error;

/// Storage backend failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("storage failure: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
