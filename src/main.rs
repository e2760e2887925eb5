//! Demo entry point
//!
//! Seeds an in-memory account store, wires up the transfer engine from
//! `config/{env}.yaml` and drives a few transfers through it: a free one,
//! a fee-bearing one and a rejected one.

use std::sync::Arc;

use tracing::info;

use upi_transfer_engine::config::AppConfig;
use upi_transfer_engine::logging::init_logging;
use upi_transfer_engine::{
    Account, FeePolicy, InMemoryAccountStore, InMemoryTransactionStore, Money, TransferEngine,
    TransferRequest, TransferValidator,
};

fn get_env() -> String {
    std::env::args().nth(1).unwrap_or_else(|| "dev".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);
    info!(env = %env, "starting transfer engine demo");

    let accounts = Arc::new(InMemoryAccountStore::new());
    accounts.insert(Account::new("alice@okbank", Money::from_major(5000)).with_phone("9000000001"));
    accounts.insert(Account::new("bob@okbank", Money::from_major(100)).with_phone("9000000002"));
    accounts.insert(Account::new("merchant@paytm", Money::ZERO));

    let ledger = Arc::new(InMemoryTransactionStore::new());
    let engine = TransferEngine::with_policies(
        accounts.clone(),
        ledger.clone(),
        TransferValidator::new(config.engine.min_amount, config.engine.max_amount),
        FeePolicy::new(config.engine.fee_threshold, config.engine.flat_fee),
    );

    // Below the fee threshold: moves for free
    let result = engine
        .execute(
            TransferRequest::new("alice@okbank", "bob@okbank", Money::from_major(500))
                .with_remarks("rent"),
        )
        .await?;
    info!(transaction_id = %result.transaction_id, fee = %result.fee, "small transfer done");

    // Above the threshold: flat fee applies
    let result = engine
        .execute(TransferRequest::new(
            "alice@okbank",
            "merchant@paytm",
            Money::from_major(2000),
        ))
        .await?;
    info!(transaction_id = %result.transaction_id, fee = %result.fee, "large transfer done");

    // More than the remaining balance: rejected, nothing moves
    if let Err(err) = engine
        .execute(TransferRequest::new(
            "bob@okbank",
            "merchant@paytm",
            Money::from_major(10_000),
        ))
        .await
    {
        info!(code = err.code(), "rejected as expected: {err}");
    }

    for upi_id in ["alice@okbank", "bob@okbank", "merchant@paytm"] {
        if let Some(balance) = engine.check_balance(upi_id).await? {
            info!(account = upi_id, balance = %balance, "final balance");
        }
    }
    info!(ledger_records = ledger.len(), "demo finished");

    Ok(())
}
