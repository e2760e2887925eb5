//! UPI Transfer Execution Engine
//!
//! Moves value between two named accounts: validation, fee computation,
//! balance consistency and an auditable transaction record, all as a
//! single atomic unit under concurrent execution.
//!
//! # Modules
//!
//! - [`money`] - Fixed-point money type (exact, scale 2)
//! - [`fee`] - Flat-fee schedule
//! - [`account`] - Account model and locate-and-lock store
//! - [`ledger`] - Append-only transaction record store
//! - [`transfer`] - Validator, error taxonomy and the execution engine
//! - [`store`] - Shared storage-layer error
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing setup

pub mod account;
pub mod config;
pub mod fee;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod store;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountHandle, AccountStatus, AccountStore, InMemoryAccountStore};
pub use fee::FeePolicy;
pub use ledger::{
    InMemoryTransactionStore, Transaction, TransactionId, TransactionStatus, TransactionStore,
};
pub use money::{Money, MoneyError};
pub use store::StoreError;
pub use transfer::{
    AccountSide, ExecutionPhase, TransferEngine, TransferError, TransferRequest, TransferResult,
    TransferValidator,
};
