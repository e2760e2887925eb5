//! Integration tests for the transfer engine
//!
//! These run the complete execution path against the in-memory stores.
//! Persistence failures are simulated with failing store wrappers so the
//! compensation path is exercised without a real backend.

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::account::{Account, AccountHandle, AccountStatus, AccountStore, InMemoryAccountStore};
    use crate::fee::FeePolicy;
    use crate::ledger::{
        InMemoryTransactionStore, Transaction, TransactionStatus, TransactionStore,
    };
    use crate::money::Money;
    use crate::store::StoreError;
    use crate::transfer::engine::TransferEngine;
    use crate::transfer::error::{AccountSide, TransferError};
    use crate::transfer::types::TransferRequest;
    use crate::transfer::validator::TransferValidator;

    // ========================================================================
    // Failure-injecting store wrappers
    // ========================================================================

    /// Account store whose `save` can be switched to fail.
    struct FailingAccountStore {
        inner: InMemoryAccountStore,
        fail_save: AtomicBool,
    }

    impl FailingAccountStore {
        fn new(inner: InMemoryAccountStore) -> Self {
            Self {
                inner,
                fail_save: AtomicBool::new(false),
            }
        }

        fn set_fail_save(&self, fail: bool) {
            self.fail_save.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl AccountStore for FailingAccountStore {
        async fn find_for_update(
            &self,
            upi_id: &str,
        ) -> Result<Option<AccountHandle>, StoreError> {
            self.inner.find_for_update(upi_id).await
        }

        async fn save(&self, account: &AccountHandle) -> Result<(), StoreError> {
            if self.fail_save.load(Ordering::SeqCst) {
                return Err(StoreError::new("injected save failure"));
            }
            self.inner.save(account).await
        }
    }

    /// Transaction store whose `append` can be switched to fail.
    struct FailingTransactionStore {
        inner: InMemoryTransactionStore,
        fail_append: AtomicBool,
    }

    impl FailingTransactionStore {
        fn new(inner: InMemoryTransactionStore) -> Self {
            Self {
                inner,
                fail_append: AtomicBool::new(false),
            }
        }

        fn set_fail_append(&self, fail: bool) {
            self.fail_append.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TransactionStore for FailingTransactionStore {
        async fn append(&self, transaction: Transaction) -> Result<(), StoreError> {
            if self.fail_append.load(Ordering::SeqCst) {
                return Err(StoreError::new("injected append failure"));
            }
            self.inner.append(transaction).await
        }

        async fn find_by_id(
            &self,
            transaction_id: &str,
        ) -> Result<Option<Transaction>, StoreError> {
            self.inner.find_by_id(transaction_id).await
        }
    }

    // ========================================================================
    // Test harness
    // ========================================================================

    struct TestHarness {
        engine: TransferEngine,
        accounts: Arc<FailingAccountStore>,
        ledger: Arc<FailingTransactionStore>,
    }

    impl TestHarness {
        fn new(seed: Vec<Account>) -> Self {
            let inner = InMemoryAccountStore::new();
            for account in seed {
                inner.insert(account);
            }
            let accounts = Arc::new(FailingAccountStore::new(inner));
            let ledger = Arc::new(FailingTransactionStore::new(
                InMemoryTransactionStore::new(),
            ));
            let engine = TransferEngine::new(accounts.clone(), ledger.clone());
            Self {
                engine,
                accounts,
                ledger,
            }
        }

        async fn balance(&self, upi_id: &str) -> Money {
            self.accounts
                .inner
                .balance_of(upi_id)
                .await
                .expect("account exists")
        }
    }

    fn default_seed() -> Vec<Account> {
        vec![
            Account::new("alice@okbank", Money::from_major(5000)),
            Account::new("bob@okbank", Money::from_major(100)),
        ]
    }

    // ========================================================================
    // Happy paths
    // ========================================================================

    /// Conservation: source loses amount + fee, destination gains amount.
    #[tokio::test]
    async fn test_fee_bearing_transfer_conserves_money() {
        let harness = TestHarness::new(default_seed());

        let result = harness
            .engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "bob@okbank",
                Money::from_major(2000),
            ))
            .await
            .unwrap();

        assert_eq!(result.fee, Money::from_major(5));
        assert_eq!(result.total_debited, Money::from_major(2005));
        // 5000 - 2000 - 5
        assert_eq!(
            harness.balance("alice@okbank").await,
            Money::from_major(2995)
        );
        // 100 + 2000 (fee is not credited to the destination)
        assert_eq!(harness.balance("bob@okbank").await, Money::from_major(2100));
        assert_eq!(harness.ledger.inner.len(), 1);
    }

    #[tokio::test]
    async fn test_threshold_amount_is_free() {
        let harness = TestHarness::new(default_seed());

        let result = harness
            .engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "bob@okbank",
                Money::parse("1000.00").unwrap(),
            ))
            .await
            .unwrap();

        assert_eq!(result.fee, Money::ZERO);
        assert_eq!(result.total_debited, Money::parse("1000.00").unwrap());
    }

    // ========================================================================
    // Business rejections
    // ========================================================================

    #[tokio::test]
    async fn test_insufficient_balance_message_and_failed_record() {
        let harness = TestHarness::new(vec![
            Account::new("alice@okbank", Money::from_major(100)),
            Account::new("bob@okbank", Money::ZERO),
        ]);

        let err = harness
            .engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "bob@okbank",
                Money::from_major(500),
            ))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Insufficient balance. Available: 100.00, Required: 500.00"
        );
        // No balance changed on either side
        assert_eq!(harness.balance("alice@okbank").await, Money::from_major(100));
        assert_eq!(harness.balance("bob@okbank").await, Money::ZERO);

        // The attempt itself is on the ledger as FAILED
        assert_eq!(harness.ledger.inner.len(), 1);
    }

    #[tokio::test]
    async fn test_suspended_destination_rejected_with_failed_record() {
        let harness = TestHarness::new(vec![
            Account::new("alice@okbank", Money::from_major(5000)),
            Account::new("dormant@upi", Money::ZERO).with_status(AccountStatus::Suspended),
        ]);

        let err = harness
            .engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "dormant@upi",
                Money::from_major(10),
            ))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransferError::AccountNotActive {
                side: AccountSide::Destination,
                upi_id: "dormant@upi".to_string(),
                status: AccountStatus::Suspended,
            }
        );
        assert_eq!(
            harness.balance("alice@okbank").await,
            Money::from_major(5000)
        );
        assert_eq!(harness.ledger.inner.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_destination_leaves_ledger_untouched() {
        let harness = TestHarness::new(default_seed());

        let err = harness
            .engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "ghost@upi",
                Money::from_major(10),
            ))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Destination"));
        assert_eq!(harness.ledger.inner.len(), 0);
        assert_eq!(
            harness.balance("alice@okbank").await,
            Money::from_major(5000)
        );
    }

    // ========================================================================
    // Persistence failures and compensation
    // ========================================================================

    #[tokio::test]
    async fn test_save_failure_rolls_back_both_balances() {
        let harness = TestHarness::new(default_seed());
        harness.accounts.set_fail_save(true);

        let err = harness
            .engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "bob@okbank",
                Money::from_major(2000),
            ))
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(matches!(err, TransferError::Persistence(_)));
        assert_eq!(
            harness.balance("alice@okbank").await,
            Money::from_major(5000)
        );
        assert_eq!(harness.balance("bob@okbank").await, Money::from_major(100));
        assert_eq!(harness.ledger.inner.len(), 0);
    }

    #[tokio::test]
    async fn test_append_failure_rolls_back_both_balances() {
        let harness = TestHarness::new(default_seed());
        harness.ledger.set_fail_append(true);

        let err = harness
            .engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "bob@okbank",
                Money::from_major(300),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Persistence(_)));
        assert_eq!(
            harness.balance("alice@okbank").await,
            Money::from_major(5000)
        );
        assert_eq!(harness.balance("bob@okbank").await, Money::from_major(100));
        assert_eq!(harness.ledger.inner.len(), 0);

        // The same engine recovers once the store does
        harness.ledger.set_fail_append(false);
        let result = harness
            .engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "bob@okbank",
                Money::from_major(300),
            ))
            .await
            .unwrap();
        assert_eq!(result.status, TransactionStatus::Success);
        assert_eq!(harness.ledger.inner.len(), 1);
    }

    // ========================================================================
    // Record contents
    // ========================================================================

    #[tokio::test]
    async fn test_failed_record_carries_reason() {
        let harness = TestHarness::new(vec![
            Account::new("alice@okbank", Money::from_major(100)),
            Account::new("bob@okbank", Money::ZERO),
        ]);

        let _ = harness
            .engine
            .execute(
                TransferRequest::new("alice@okbank", "bob@okbank", Money::from_major(500))
                    .with_remarks("too ambitious"),
            )
            .await
            .unwrap_err();

        let records = harness.ledger.inner.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.status, TransactionStatus::Failed);
        assert_eq!(record.amount, Money::from_major(500));
        assert_eq!(record.total_debited, Money::from_major(500));
        assert!(
            record
                .failure_reason
                .as_deref()
                .unwrap()
                .contains("Insufficient balance")
        );
        assert_eq!(record.remarks.as_deref(), Some("too ambitious"));
    }

    #[tokio::test]
    async fn test_long_remarks_truncated_on_record() {
        let harness = TestHarness::new(default_seed());
        let long_remarks = "r".repeat(400);

        let result = harness
            .engine
            .execute(
                TransferRequest::new("alice@okbank", "bob@okbank", Money::from_major(10))
                    .with_remarks(long_remarks),
            )
            .await
            .unwrap();

        assert_eq!(result.remarks.as_ref().unwrap().chars().count(), 255);

        let record = harness
            .engine
            .transaction_status(result.transaction_id.as_str())
            .await
            .unwrap()
            .expect("record exists");
        assert_eq!(record.remarks.unwrap().chars().count(), 255);
    }

    #[tokio::test]
    async fn test_custom_policies_are_honored() {
        let inner = InMemoryAccountStore::new();
        inner.insert(Account::new("alice@okbank", Money::from_major(100)));
        inner.insert(Account::new("bob@okbank", Money::ZERO));
        let accounts = Arc::new(inner);
        let ledger = Arc::new(InMemoryTransactionStore::new());

        // Fee on everything above 10.00; transfers capped at 50.00.
        let engine = TransferEngine::with_policies(
            accounts.clone(),
            ledger,
            TransferValidator::new(Money::from_major(1), Money::from_major(50)),
            FeePolicy::new(Money::from_major(10), Money::from_minor(150)),
        );

        let err = engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "bob@okbank",
                Money::from_major(60),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Maximum per-transaction limit is 50.00");

        let result = engine
            .execute(TransferRequest::new(
                "alice@okbank",
                "bob@okbank",
                Money::from_major(20),
            ))
            .await
            .unwrap();
        assert_eq!(result.fee, Money::from_minor(150));
        assert_eq!(
            accounts.balance_of("alice@okbank").await,
            Some(Money::parse("78.50").unwrap())
        );
    }

    // ========================================================================
    // Concurrency
    // ========================================================================

    /// Overlapping fan-out from one source: exactly one success per
    /// available 100.00, never a negative balance.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_fanout_spends_exactly_available_funds() {
        let mut seed = vec![Account::new("hub@okbank", Money::from_major(300))];
        for i in 0..5 {
            seed.push(Account::new(format!("spoke{}@okbank", i), Money::ZERO));
        }
        let harness = Arc::new(TestHarness::new(seed));

        let mut handles = Vec::new();
        for i in 0..5 {
            let harness = harness.clone();
            handles.push(tokio::spawn(async move {
                harness
                    .engine
                    .execute(TransferRequest::new(
                        "hub@okbank",
                        format!("spoke{}@okbank", i),
                        Money::from_major(100),
                    ))
                    .await
            }));
        }

        let mut successes = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(TransferError::InsufficientBalance { .. }) => insufficient += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 3);
        assert_eq!(insufficient, 2);
        assert_eq!(harness.balance("hub@okbank").await, Money::ZERO);

        let mut credited = Money::ZERO;
        for i in 0..5 {
            let balance = harness.balance(&format!("spoke{}@okbank", i)).await;
            assert!(!balance.is_negative());
            credited = credited.checked_add(balance).unwrap();
        }
        assert_eq!(credited, Money::from_major(300));
    }

    /// Opposite-direction transfers over the same pair must not deadlock
    /// and must conserve the pair's total.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_opposite_directions_same_pair_no_deadlock() {
        let harness = Arc::new(TestHarness::new(vec![
            Account::new("alice@okbank", Money::from_major(1000)),
            Account::new("bob@okbank", Money::from_major(1000)),
        ]));

        let mut handles = Vec::new();
        for i in 0..40 {
            let harness = harness.clone();
            let (from, to) = if i % 2 == 0 {
                ("alice@okbank", "bob@okbank")
            } else {
                ("bob@okbank", "alice@okbank")
            };
            handles.push(tokio::spawn(async move {
                harness
                    .engine
                    .execute(TransferRequest::new(from, to, Money::from_major(10)))
                    .await
            }));
        }

        for handle in handles {
            // Individual transfers may hit insufficient funds; the run
            // itself must complete.
            let _ = handle.await.unwrap();
        }

        let total = harness
            .balance("alice@okbank")
            .await
            .checked_add(harness.balance("bob@okbank").await)
            .unwrap();
        // Fee-free amounts: the pair's total is conserved exactly.
        assert_eq!(total, Money::from_major(2000));
    }
}
