//! Account types for the chart of accounts
//!
//! This module defines the account structure for double-entry bookkeeping.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AccountId, Currency, LedgerId};
use crate::entry::Direction;
use crate::error::LedgerError;

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Income accounts (credit normal balance)
    Income,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }

    /// The direction that increases this account's balance
    pub fn normal_side(&self) -> Direction {
        if self.is_debit_normal() {
            Direction::Debit
        } else {
            Direction::Credit
        }
    }

    /// Income and expense accounts are zeroed at period close
    pub fn is_result_account(&self) -> bool {
        matches!(self, AccountType::Income | AccountType::Expense)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountType::Asset => "ASSET",
            AccountType::Liability => "LIABILITY",
            AccountType::Equity => "EQUITY",
            AccountType::Income => "INCOME",
            AccountType::Expense => "EXPENSE",
        };
        f.write_str(label)
    }
}

/// An account in the chart of accounts
///
/// Accounts are opened once and never deleted. Deactivation is soft and
/// returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Owning ledger
    pub ledger_id: LedgerId,
    /// Account code, unique within the ledger (e.g., "5121")
    pub code: String,
    /// Account name
    pub name: String,
    /// Account type
    pub account_type: AccountType,
    /// Currency every posting on this account must use
    pub currency: Currency,
    /// Whether account is active
    pub is_active: bool,
}

impl Account {
    /// Opens a new, active account
    ///
    /// # Errors
    ///
    /// Returns a validation error if the code or the name is blank
    pub fn open(
        id: AccountId,
        ledger_id: LedgerId,
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        currency: Currency,
    ) -> Result<Self, LedgerError> {
        let code = code.into();
        let name = name.into();
        if code.trim().is_empty() {
            return Err(LedgerError::validation("Account code is required"));
        }
        if name.trim().is_empty() {
            return Err(LedgerError::validation("Account name is required"));
        }

        Ok(Self {
            id,
            ledger_id,
            code: code.trim().to_string(),
            name,
            account_type,
            currency,
            is_active: true,
        })
    }

    /// Returns the deactivated version of this account
    pub fn deactivate(self) -> Self {
        Self {
            is_active: false,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(code: &str, name: &str) -> Result<Account, LedgerError> {
        Account::open(
            AccountId::new(),
            LedgerId::new(),
            code,
            name,
            AccountType::Asset,
            Currency::EUR,
        )
    }

    #[test]
    fn test_normal_sides() {
        assert_eq!(AccountType::Asset.normal_side(), Direction::Debit);
        assert_eq!(AccountType::Expense.normal_side(), Direction::Debit);
        assert_eq!(AccountType::Liability.normal_side(), Direction::Credit);
        assert_eq!(AccountType::Equity.normal_side(), Direction::Credit);
        assert_eq!(AccountType::Income.normal_side(), Direction::Credit);
    }

    #[test]
    fn test_open_trims_code() {
        let account = open(" 5121 ", "Bank").unwrap();
        assert_eq!(account.code, "5121");
        assert!(account.is_active);
    }

    #[test]
    fn test_open_rejects_blank_fields() {
        assert!(matches!(open("  ", "Bank"), Err(LedgerError::Validation(_))));
        assert!(matches!(open("5121", ""), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_deactivate_keeps_identity() {
        let account = open("5121", "Bank").unwrap();
        let id = account.id;
        let inactive = account.deactivate();
        assert_eq!(inactive.id, id);
        assert!(!inactive.is_active);
    }
}
