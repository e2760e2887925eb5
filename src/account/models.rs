//! Account data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

/// Account status. Only ACTIVE accounts may take part in transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Inactive => "INACTIVE",
            AccountStatus::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-period usage counters.
///
/// Reserved fields: carried in the data model for the external policy
/// layer, never enforced by the transfer engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UsageCounters {
    pub daily_limit: Money,
    pub daily_used: Money,
    pub monthly_limit: Money,
    pub monthly_used: Money,
}

impl Default for UsageCounters {
    fn default() -> Self {
        Self {
            daily_limit: Money::from_major(100_000),
            daily_used: Money::ZERO,
            monthly_limit: Money::from_major(1_000_000),
            monthly_used: Money::ZERO,
        }
    }
}

/// A customer account addressed by its UPI id.
///
/// # Invariants (enforced by private fields)
/// - `upi_id` is immutable after creation
/// - `balance` never goes negative: all mutations run through validated
///   `credit`/`debit` with checked arithmetic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    upi_id: String,
    phone: Option<String>,
    balance: Money,
    status: AccountStatus,
    limits: UsageCounters,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Create an ACTIVE account with an opening balance.
    pub fn new(upi_id: impl Into<String>, opening_balance: Money) -> Self {
        Self {
            upi_id: upi_id.into(),
            phone: None,
            balance: opening_balance,
            status: AccountStatus::Active,
            limits: UsageCounters::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[inline]
    pub fn upi_id(&self) -> &str {
        &self.upi_id
    }

    #[inline]
    pub fn balance(&self) -> Money {
        self.balance
    }

    #[inline]
    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn set_status(&mut self, status: AccountStatus) {
        self.status = status;
    }

    #[inline]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[inline]
    pub fn limits(&self) -> &UsageCounters {
        &self.limits
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Add funds to the balance.
    ///
    /// # Errors
    /// - non-positive amount
    /// - arithmetic overflow
    pub fn credit(&mut self, amount: Money) -> Result<(), &'static str> {
        if amount.is_negative() {
            return Err("Credit amount must not be negative");
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .map_err(|_| "Credit overflow")?;
        Ok(())
    }

    /// Remove funds from the balance.
    ///
    /// # Errors
    /// - non-positive amount
    /// - insufficient funds (balance would go negative)
    pub fn debit(&mut self, amount: Money) -> Result<(), &'static str> {
        if amount.is_negative() {
            return Err("Debit amount must not be negative");
        }
        if self.balance < amount {
            return Err("Insufficient funds");
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .map_err(|_| "Debit underflow")?;
        Ok(())
    }
}
