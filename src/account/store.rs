//! Account store abstraction and in-memory implementation
//!
//! `find_for_update` hands back an [`AccountHandle`]: exclusive mutation
//! access to one account, held until the handle is dropped. Between
//! acquisition and drop no other execution can observe or apply a
//! conflicting mutation to that account.
//!
//! The engine is the only lock consumer and always acquires pairs of
//! handles in a fixed global order; the store itself imposes no ordering.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::models::Account;
use crate::money::Money;
use crate::store::StoreError;

/// Exclusive mutation handle for one account.
///
/// Dereferences to the [`Account`]; mutations become observable to other
/// executions only after the handle is dropped.
pub struct AccountHandle {
    guard: OwnedMutexGuard<Account>,
}

impl AccountHandle {
    pub fn new(guard: OwnedMutexGuard<Account>) -> Self {
        Self { guard }
    }
}

impl Deref for AccountHandle {
    type Target = Account;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for AccountHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

/// Account store consumed by the transfer engine.
///
/// Implementations are long-lived and injected at engine construction,
/// never built per call.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Locate an account and acquire its mutation handle.
    ///
    /// Returns `Ok(None)` (not an error) when no account has this id.
    async fn find_for_update(&self, upi_id: &str) -> Result<Option<AccountHandle>, StoreError>;

    /// Persist the handle's current state.
    ///
    /// Must be called while the handle is still held; fails only on
    /// storage-layer errors.
    async fn save(&self, account: &AccountHandle) -> Result<(), StoreError>;
}

/// In-memory account store keyed by UPI id.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<String, Arc<Mutex<Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace an account record.
    pub fn insert(&self, account: Account) {
        self.accounts
            .insert(account.upi_id().to_string(), Arc::new(Mutex::new(account)));
    }

    /// Current balance, locking the account briefly.
    pub async fn balance_of(&self, upi_id: &str) -> Option<Money> {
        let slot = self.accounts.get(upi_id).map(|e| Arc::clone(e.value()));
        match slot {
            Some(slot) => Some(slot.lock().await.balance()),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_for_update(&self, upi_id: &str) -> Result<Option<AccountHandle>, StoreError> {
        // Clone the slot out of the map so the shard guard is released
        // before awaiting the account lock.
        let slot = self.accounts.get(upi_id).map(|e| Arc::clone(e.value()));
        match slot {
            Some(slot) => Ok(Some(AccountHandle::new(slot.lock_owned().await))),
            None => Ok(None),
        }
    }

    async fn save(&self, _account: &AccountHandle) -> Result<(), StoreError> {
        // Mutations through the handle land directly in the shared record;
        // they become visible once the handle is dropped.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountStatus;
    use std::time::Duration;

    fn seeded_store() -> InMemoryAccountStore {
        let store = InMemoryAccountStore::new();
        store.insert(Account::new("alice@okbank", Money::from_major(500)));
        store.insert(
            Account::new("frozen@okbank", Money::from_major(10))
                .with_status(AccountStatus::Suspended),
        );
        store
    }

    #[tokio::test]
    async fn test_find_for_update_and_mutate() {
        let store = seeded_store();

        {
            let mut handle = store
                .find_for_update("alice@okbank")
                .await
                .unwrap()
                .expect("account exists");
            handle.debit(Money::from_major(100)).unwrap();
            store.save(&handle).await.unwrap();
        }

        assert_eq!(
            store.balance_of("alice@okbank").await,
            Some(Money::from_major(400))
        );
    }

    #[tokio::test]
    async fn test_missing_account_is_none() {
        let store = seeded_store();
        assert!(
            store
                .find_for_update("nonexistent@fake")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.balance_of("nonexistent@fake").await, None);
    }

    #[tokio::test]
    async fn test_handle_is_exclusive() {
        let store = seeded_store();

        let handle = store
            .find_for_update("alice@okbank")
            .await
            .unwrap()
            .expect("account exists");

        // A second acquisition must block until the first handle drops.
        let second = tokio::time::timeout(
            Duration::from_millis(50),
            store.find_for_update("alice@okbank"),
        )
        .await;
        assert!(second.is_err(), "second handle acquired while first held");

        drop(handle);

        let reacquired = tokio::time::timeout(
            Duration::from_millis(50),
            store.find_for_update("alice@okbank"),
        )
        .await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_insert_replaces() {
        let store = seeded_store();
        store.insert(Account::new("alice@okbank", Money::from_major(1)));
        assert_eq!(
            store.balance_of("alice@okbank").await,
            Some(Money::from_major(1))
        );
        assert_eq!(store.len(), 2);
    }
}
