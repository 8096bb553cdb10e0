//! Ledger entries
//!
//! An entry is one immutable debit or credit leg on one account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AccountId, EntryId, Money, TransactionId};
use crate::account::AccountType;
use crate::error::LedgerError;

/// Side of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Debit => Direction::Credit,
            Direction::Credit => Direction::Debit,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Debit => f.write_str("DEBIT"),
            Direction::Credit => f.write_str("CREDIT"),
        }
    }
}

/// One leg of a posted journal transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    /// Transaction this entry belongs to
    pub transaction_id: TransactionId,
    pub account_id: AccountId,
    /// Always strictly positive; the side is carried by `direction`
    pub amount: Money,
    pub direction: Direction,
    pub description: String,
    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
    /// First instant of the transaction's business date in the ledger's
    /// time zone; period windows are evaluated on this instant
    pub effective_at: DateTime<Utc>,
}

impl LedgerEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntryId,
        transaction_id: TransactionId,
        account_id: AccountId,
        amount: Money,
        direction: Direction,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
        effective_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::validation(format!(
                "Entry amount must be positive, got {}",
                amount
            )));
        }

        Ok(Self {
            id,
            transaction_id,
            account_id,
            amount,
            direction,
            description: description.into(),
            created_at,
            effective_at,
        })
    }

    /// Effect of this entry on the balance of an account of the given type
    ///
    /// - Asset & Expense accounts: Debits increase, Credits decrease
    /// - Liability, Equity & Income accounts: Credits increase, Debits decrease
    pub fn balance_effect(&self, account_type: AccountType) -> Money {
        if self.direction == account_type.normal_side() {
            self.amount
        } else {
            self.amount.negate()
        }
    }
}
