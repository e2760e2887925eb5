//! Execution phases of one transfer
//!
//! Linear progression with a single absorbing FAILED phase reachable from
//! every step before COMPLETED. The engine traces each transition; no
//! phase is persisted.

use std::fmt;

/// Phase of one transfer execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionPhase {
    Validating,
    LocatingAccounts,
    ComputingFee,
    CheckingBalance,
    MutatingBalances,
    RecordingTransaction,
    /// Terminal: transfer applied and recorded.
    Completed,
    /// Terminal: rejected or aborted; no lasting balance change.
    Failed,
}

impl ExecutionPhase {
    /// True once no further transition is possible.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionPhase::Completed | ExecutionPhase::Failed)
    }

    /// True while account handles may be held.
    #[inline]
    pub fn holds_locks(&self) -> bool {
        matches!(
            self,
            ExecutionPhase::LocatingAccounts
                | ExecutionPhase::ComputingFee
                | ExecutionPhase::CheckingBalance
                | ExecutionPhase::MutatingBalances
                | ExecutionPhase::RecordingTransaction
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionPhase::Validating => "VALIDATING",
            ExecutionPhase::LocatingAccounts => "LOCATING_ACCOUNTS",
            ExecutionPhase::ComputingFee => "COMPUTING_FEE",
            ExecutionPhase::CheckingBalance => "CHECKING_BALANCE",
            ExecutionPhase::MutatingBalances => "MUTATING_BALANCES",
            ExecutionPhase::RecordingTransaction => "RECORDING_TRANSACTION",
            ExecutionPhase::Completed => "COMPLETED",
            ExecutionPhase::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(ExecutionPhase::Completed.is_terminal());
        assert!(ExecutionPhase::Failed.is_terminal());

        assert!(!ExecutionPhase::Validating.is_terminal());
        assert!(!ExecutionPhase::LocatingAccounts.is_terminal());
        assert!(!ExecutionPhase::MutatingBalances.is_terminal());
    }

    #[test]
    fn test_lock_scope() {
        // Validation and the terminal phases run outside any lock
        assert!(!ExecutionPhase::Validating.holds_locks());
        assert!(!ExecutionPhase::Completed.holds_locks());
        assert!(!ExecutionPhase::Failed.holds_locks());

        assert!(ExecutionPhase::LocatingAccounts.holds_locks());
        assert!(ExecutionPhase::CheckingBalance.holds_locks());
        assert!(ExecutionPhase::RecordingTransaction.holds_locks());
    }

    #[test]
    fn test_display() {
        assert_eq!(ExecutionPhase::Validating.to_string(), "VALIDATING");
        assert_eq!(
            ExecutionPhase::RecordingTransaction.to_string(),
            "RECORDING_TRANSACTION"
        );
    }
}
