//! Ledger domain errors

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{ErrorKind, MoneyError, PortError, TemporalError};

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Missing or malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Accounting period not found
    #[error("Accounting period not found: {0}")]
    PeriodNotFound(String),

    /// Journal transaction not found
    #[error("Journal transaction not found: {0}")]
    TransactionNotFound(String),

    /// Account code already used in the ledger
    #[error("Account code {code} already exists in ledger {ledger}")]
    DuplicateAccountCode {
        ledger: String,
        code: String,
    },

    /// A new period would overlap an existing one
    #[error("Accounting period {name} overlaps existing period {existing}")]
    PeriodOverlap {
        name: String,
        existing: String,
    },

    /// Postings or accounts of one transaction use different currencies
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),

    /// No period covers the business date
    #[error("No accounting period covering date {0}")]
    NoPeriodCoversDate(NaiveDate),

    /// The covering period does not accept postings
    #[error("Accounting period {name} is not open (status {status})")]
    PeriodNotOpen {
        name: String,
        status: String,
    },

    /// Transaction is not balanced
    #[error("Unbalanced transaction: debits={debits}, credits={credits}")]
    UnbalancedTransaction {
        debits: Decimal,
        credits: Decimal,
    },

    /// A state machine refused a transition
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error("Repository error: {0}")]
    Repository(#[from] PortError),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        LedgerError::InvalidStateTransition(message.into())
    }

    /// Classifies this error for callers
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_)
            | LedgerError::CurrencyMismatch(_)
            | LedgerError::UnbalancedTransaction { .. }
            | LedgerError::Money(_)
            | LedgerError::Temporal(_) => ErrorKind::Validation,
            LedgerError::AccountNotFound(_)
            | LedgerError::PeriodNotFound(_)
            | LedgerError::TransactionNotFound(_)
            | LedgerError::NoPeriodCoversDate(_) => ErrorKind::NotFound,
            LedgerError::DuplicateAccountCode { .. }
            | LedgerError::PeriodOverlap { .. }
            | LedgerError::PeriodNotOpen { .. }
            | LedgerError::InvalidStateTransition(_) => ErrorKind::StateConflict,
            LedgerError::Repository(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbalanced_is_a_validation_failure() {
        let err = LedgerError::UnbalancedTransaction {
            debits: Decimal::ONE,
            credits: Decimal::ZERO,
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_closed_period_is_a_state_conflict() {
        let err = LedgerError::PeriodNotOpen {
            name: "2024-01".into(),
            status: "CLOSED".into(),
        };
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(err.to_string(), "Accounting period 2024-01 is not open (status CLOSED)");
    }

    #[test]
    fn test_repository_errors_keep_their_kind() {
        let err: LedgerError = PortError::internal("lock poisoned").into();
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
    }
}
