//! Settlement domain errors

use thiserror::Error;

use core_kernel::{ErrorKind, Money, MoneyError, PortError};
use domain_ledger::LedgerError;

/// Errors that can occur while settling invoices
#[derive(Debug, Error)]
pub enum SettlementError {
    /// Missing or malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// A configured account code does not exist in the ledger
    #[error("{role} account not found: {code}")]
    AccountNotConfigured {
        role: &'static str,
        code: String,
    },

    /// The invoice has no remaining balance
    #[error("Invoice {0} is already fully paid")]
    AlreadySettled(String),

    /// The open credit pool cannot cover the requested amount
    #[error("Not enough stored credit available: requested {requested}, available {available}")]
    InsufficientCredit {
        requested: Money,
        available: Money,
    },

    /// The invoice status forbids the operation
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// A credit note targets an invoice with no ledger posting
    #[error("Cannot credit a non-posted invoice: {0}")]
    InvoiceNotPosted(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error("Repository error: {0}")]
    Repository(#[from] PortError),
}

impl SettlementError {
    pub fn validation(message: impl Into<String>) -> Self {
        SettlementError::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        SettlementError::InvalidStateTransition(message.into())
    }

    /// Classifies this error for callers
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettlementError::Validation(_) | SettlementError::Money(_) => ErrorKind::Validation,
            SettlementError::InvoiceNotFound(_) | SettlementError::AccountNotConfigured { .. } => {
                ErrorKind::NotFound
            }
            SettlementError::AlreadySettled(_)
            | SettlementError::InsufficientCredit { .. }
            | SettlementError::InvalidStateTransition(_)
            | SettlementError::InvoiceNotPosted(_) => ErrorKind::StateConflict,
            SettlementError::Ledger(e) => e.kind(),
            SettlementError::Repository(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_credit_is_a_state_conflict() {
        let err = SettlementError::InsufficientCredit {
            requested: Money::new(dec!(50), Currency::EUR),
            available: Money::new(dec!(10), Currency::EUR),
        };
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert!(err.to_string().contains("Not enough stored credit"));
    }

    #[test]
    fn test_ledger_errors_keep_their_kind() {
        let err: SettlementError = LedgerError::validation("blank reference").into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: SettlementError = LedgerError::AccountNotFound("5121".into()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
