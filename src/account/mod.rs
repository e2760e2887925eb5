//! Account model and store
//!
//! The account record (balance, status, reserved usage counters) and the
//! store abstraction the transfer engine consumes: locate-and-lock plus
//! save, with an in-memory implementation for tests and single-process
//! deployments.

pub mod models;
pub mod store;

pub use models::{Account, AccountStatus, UsageCounters};
pub use store::{AccountHandle, AccountStore, InMemoryAccountStore};
