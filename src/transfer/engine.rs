//! Transfer Execution Engine
//!
//! Orchestrates validator, fee policy, account store and ledger to carry
//! one transfer end-to-end, owning the concurrency and atomicity
//! guarantees:
//!
//! ```text
//! VALIDATING → LOCATING_ACCOUNTS → COMPUTING_FEE → CHECKING_BALANCE
//!     → MUTATING_BALANCES → RECORDING_TRANSACTION → COMPLETED
//! ```
//!
//! with a single absorbing FAILED phase reachable from every step before
//! COMPLETED.
//!
//! # Safety Invariants
//!
//! 1. **Ordered locking**: both account handles are acquired in
//!    lexicographic UPI order regardless of transfer direction, so two
//!    concurrent transfers over the same pair can never deadlock.
//! 2. **Narrow lock scope**: validation runs before any store access and
//!    the response is built after both handles are released.
//! 3. **All-or-nothing**: balance mutation and the ledger append are one
//!    unit. A store failure after mutation triggers a compensating
//!    rollback of both balances before the error surfaces.
//! 4. **Expected failures stay quiet**: business-rule rejections are
//!    returned as values and logged at debug; only persistence failures
//!    reach the error level.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::error::{AccountSide, TransferError};
use super::state::ExecutionPhase;
use super::types::{TransferRequest, TransferResult};
use super::validator::TransferValidator;
use crate::account::{AccountHandle, AccountStore};
use crate::fee::FeePolicy;
use crate::ledger::{
    Transaction, TransactionId, TransactionStatus, TransactionStore, bounded_remarks,
};
use crate::money::Money;
use crate::store::StoreError;

/// Attempts at minting an unused transaction id before giving up.
const ID_MINT_ATTEMPTS: u32 = 8;

/// The transfer execution engine.
///
/// Long-lived; both stores are injected once at construction and shared
/// across all executions.
pub struct TransferEngine {
    accounts: Arc<dyn AccountStore>,
    ledger: Arc<dyn TransactionStore>,
    validator: TransferValidator,
    fee_policy: FeePolicy,
}

impl TransferEngine {
    /// Engine with the default validator bounds and fee schedule.
    pub fn new(accounts: Arc<dyn AccountStore>, ledger: Arc<dyn TransactionStore>) -> Self {
        Self::with_policies(
            accounts,
            ledger,
            TransferValidator::default(),
            FeePolicy::default(),
        )
    }

    pub fn with_policies(
        accounts: Arc<dyn AccountStore>,
        ledger: Arc<dyn TransactionStore>,
        validator: TransferValidator,
        fee_policy: FeePolicy,
    ) -> Self {
        Self {
            accounts,
            ledger,
            validator,
            fee_policy,
        }
    }

    /// Execute one transfer end-to-end.
    ///
    /// On success both balances have been updated and a SUCCESS record
    /// appended to the ledger. On any error no lasting balance change
    /// remains.
    pub async fn execute(
        &self,
        request: TransferRequest,
    ) -> Result<TransferResult, TransferError> {
        let source_label = sanitize_for_log(&request.source_upi);
        let destination_label = sanitize_for_log(&request.destination_upi);

        // Step 1: validate before any store access.
        debug!(
            phase = %ExecutionPhase::Validating,
            source = %source_label,
            destination = %destination_label,
            "transfer requested"
        );
        if let Err(err) = self.validator.validate(
            &request.source_upi,
            &request.destination_upi,
            request.amount,
        ) {
            debug!(code = err.code(), error = %err, "transfer rejected by validation");
            return Err(err);
        }
        let Some(amount) = request.amount else {
            return Err(TransferError::InvalidAmount("Amount is required".to_string()));
        };

        // Step 2: acquire both mutation handles in the fixed global order.
        debug!(phase = %ExecutionPhase::LocatingAccounts, "locating accounts");
        let (mut source, mut destination) = self
            .acquire_pair(&request.source_upi, &request.destination_upi)
            .await?;

        // Step 3: fee and total debit.
        debug!(phase = %ExecutionPhase::ComputingFee, "computing fee");
        let fee = self.fee_policy.fee_for(amount);
        let total_debit = amount.checked_add(fee)?;

        // Only ACTIVE accounts may take part.
        if !source.is_active() {
            let err = TransferError::AccountNotActive {
                side: AccountSide::Source,
                upi_id: source.upi_id().to_string(),
                status: source.status(),
            };
            return self
                .reject(source, destination, &request, amount, fee, total_debit, err)
                .await;
        }
        if !destination.is_active() {
            let err = TransferError::AccountNotActive {
                side: AccountSide::Destination,
                upi_id: destination.upi_id().to_string(),
                status: destination.status(),
            };
            return self
                .reject(source, destination, &request, amount, fee, total_debit, err)
                .await;
        }

        // Step 4: sufficient funds for amount plus fee.
        debug!(phase = %ExecutionPhase::CheckingBalance, required = %total_debit, "checking balance");
        if source.balance() < total_debit {
            let err = TransferError::InsufficientBalance {
                available: source.balance(),
                required: total_debit,
            };
            return self
                .reject(source, destination, &request, amount, fee, total_debit, err)
                .await;
        }

        // Step 5: mutate both balances, then persist both.
        debug!(phase = %ExecutionPhase::MutatingBalances, "applying balance mutations");
        source
            .debit(total_debit)
            .map_err(|e| TransferError::Persistence(e.to_string()))?;
        if let Err(e) = destination.credit(amount) {
            // Undo the debit before surfacing; nothing was persisted yet.
            if let Err(undo) = source.credit(total_debit) {
                error!(error = undo, "undo of source debit failed");
            }
            return Err(TransferError::Persistence(e.to_string()));
        }

        if let Err(store_err) = self.save_both(&source, &destination).await {
            error!(
                phase = %ExecutionPhase::MutatingBalances,
                error = %store_err,
                "balance persistence failed; rolling back"
            );
            self.compensate(&mut source, &mut destination, total_debit, amount)
                .await;
            return Err(TransferError::Persistence(store_err.to_string()));
        }

        // Step 6: append the SUCCESS record.
        debug!(phase = %ExecutionPhase::RecordingTransaction, "recording transaction");
        let record = match self
            .append_success_record(&request, amount, fee, total_debit)
            .await
        {
            Ok(record) => record,
            Err(err) => {
                error!(error = %err, "ledger append failed; rolling back balances");
                self.compensate(&mut source, &mut destination, total_debit, amount)
                    .await;
                return Err(err);
            }
        };

        // Step 7: release handles, then build the response.
        drop(source);
        drop(destination);
        info!(
            phase = %ExecutionPhase::Completed,
            transaction_id = %record.transaction_id,
            source = %source_label,
            destination = %destination_label,
            amount = %record.amount,
            fee = %record.fee,
            "transfer completed"
        );
        Ok(TransferResult::from(record))
    }

    /// Current balance of one account. `Ok(None)` when the account does
    /// not exist.
    pub async fn check_balance(&self, upi_id: &str) -> Result<Option<Money>, TransferError> {
        let handle = self.accounts.find_for_update(upi_id).await?;
        Ok(handle.map(|h| h.balance()))
    }

    /// Ledger lookup by transaction id. `Ok(None)` when no record has
    /// this id.
    pub async fn transaction_status(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Transaction>, TransferError> {
        Ok(self.ledger.find_by_id(transaction_id).await?)
    }

    /// Acquire both handles in lexicographic UPI order.
    ///
    /// The order is independent of which account is the source, so
    /// opposite-direction transfers over the same pair take the locks in
    /// the same sequence. A handle acquired before a not-found on the
    /// other side is released on return.
    async fn acquire_pair(
        &self,
        source_upi: &str,
        destination_upi: &str,
    ) -> Result<(AccountHandle, AccountHandle), TransferError> {
        if source_upi <= destination_upi {
            let source = self.find_side(source_upi, AccountSide::Source).await?;
            let destination = self
                .find_side(destination_upi, AccountSide::Destination)
                .await?;
            Ok((source, destination))
        } else {
            let destination = self
                .find_side(destination_upi, AccountSide::Destination)
                .await?;
            let source = self.find_side(source_upi, AccountSide::Source).await?;
            Ok((source, destination))
        }
    }

    async fn find_side(
        &self,
        upi_id: &str,
        side: AccountSide,
    ) -> Result<AccountHandle, TransferError> {
        self.accounts
            .find_for_update(upi_id)
            .await?
            .ok_or_else(|| TransferError::AccountNotFound {
                side,
                upi_id: upi_id.to_string(),
            })
    }

    async fn save_both(
        &self,
        source: &AccountHandle,
        destination: &AccountHandle,
    ) -> Result<(), StoreError> {
        self.accounts.save(source).await?;
        self.accounts.save(destination).await?;
        Ok(())
    }

    /// Business rejection after both accounts were located: release the
    /// handles, append a FAILED record best-effort, return the error.
    async fn reject(
        &self,
        source: AccountHandle,
        destination: AccountHandle,
        request: &TransferRequest,
        amount: Money,
        fee: Money,
        total_debit: Money,
        err: TransferError,
    ) -> Result<TransferResult, TransferError> {
        // The rejection mutates no balance; handles are released before
        // the ledger write.
        drop(source);
        drop(destination);
        debug!(code = err.code(), error = %err, "transfer rejected");
        self.record_failed_attempt(request, amount, fee, total_debit, &err)
            .await;
        Err(err)
    }

    async fn record_failed_attempt(
        &self,
        request: &TransferRequest,
        amount: Money,
        fee: Money,
        total_debit: Money,
        err: &TransferError,
    ) {
        let transaction_id = match self.mint_transaction_id().await {
            Ok(id) => id,
            Err(mint_err) => {
                warn!(error = %mint_err, "could not mint id for failed-attempt record");
                return;
            }
        };
        let record = Transaction {
            transaction_id,
            source_upi: request.source_upi.clone(),
            destination_upi: request.destination_upi.clone(),
            amount,
            fee,
            total_debited: total_debit,
            status: TransactionStatus::Failed,
            failure_reason: Some(err.to_string()),
            remarks: bounded_remarks(request.remarks.as_deref()),
            timestamp: Utc::now(),
        };
        if let Err(append_err) = self.ledger.append(record).await {
            warn!(error = %append_err, "failed-attempt record could not be appended");
        }
    }

    async fn append_success_record(
        &self,
        request: &TransferRequest,
        amount: Money,
        fee: Money,
        total_debit: Money,
    ) -> Result<Transaction, TransferError> {
        let transaction_id = self.mint_transaction_id().await?;
        let record = Transaction {
            transaction_id,
            source_upi: request.source_upi.clone(),
            destination_upi: request.destination_upi.clone(),
            amount,
            fee,
            total_debited: total_debit,
            status: TransactionStatus::Success,
            failure_reason: None,
            remarks: bounded_remarks(request.remarks.as_deref()),
            timestamp: Utc::now(),
        };
        self.ledger.append(record.clone()).await?;
        Ok(record)
    }

    /// Mint a transaction id unused by any prior ledger record. Ids are
    /// never reused; a suffix collision just draws again.
    async fn mint_transaction_id(&self) -> Result<TransactionId, TransferError> {
        for _ in 0..ID_MINT_ATTEMPTS {
            let id = TransactionId::generate();
            if self.ledger.find_by_id(id.as_str()).await?.is_none() {
                return Ok(id);
            }
        }
        Err(TransferError::Persistence(
            "could not mint an unused transaction id".to_string(),
        ))
    }
}

/// Strip CRLF/tab from caller-supplied identifiers before they reach the
/// log stream.
fn sanitize_for_log(input: &str) -> String {
    input.replace(['\n', '\r', '\t'], "_")
}
