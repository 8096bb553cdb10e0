//! Journal transactions and posting requests
//!
//! A [`TransactionRequest`] is what callers hand to the posting engine: a
//! journal, a reference, a business date and at least two [`Posting`]s.
//! A [`JournalTransaction`] is the immutable, balanced result.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AccountId, Currency, Money, PeriodId, TransactionId};
use crate::entry::{Direction, LedgerEntry};
use crate::error::LedgerError;

/// Reference prefix of the transaction posted by period closing
pub const CLOSING_REFERENCE_PREFIX: &str = "CLOSE-";

/// Journals a transaction can be posted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalType {
    General,
    Sales,
    Purchases,
    Bank,
    Adjustment,
}

impl JournalType {
    pub fn name(&self) -> &'static str {
        match self {
            JournalType::General => "GENERAL",
            JournalType::Sales => "SALES",
            JournalType::Purchases => "PURCHASES",
            JournalType::Bank => "BANK",
            JournalType::Adjustment => "ADJUSTMENT",
        }
    }
}

impl fmt::Display for JournalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A requested leg: account, positive amount and side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub account_id: AccountId,
    pub amount: Money,
    pub direction: Direction,
}

impl Posting {
    pub fn new(account_id: AccountId, amount: Money, direction: Direction) -> Self {
        Self {
            account_id,
            amount,
            direction,
        }
    }

    pub fn debit(account_id: AccountId, amount: Money) -> Self {
        Self::new(account_id, amount, Direction::Debit)
    }

    pub fn credit(account_id: AccountId, amount: Money) -> Self {
        Self::new(account_id, amount, Direction::Credit)
    }

    /// The same leg on the other side
    pub fn reversed(&self) -> Self {
        Self::new(self.account_id, self.amount, self.direction.opposite())
    }
}

/// Input to the posting engine
///
/// # Example
///
/// ```rust,ignore
/// let request = TransactionRequest::new(JournalType::General, "CAPITAL-001", date)
///     .described("Initial capital")
///     .debit(bank, amount)
///     .credit(capital, amount);
///
/// let transaction = engine.post_journal_transaction(request)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub journal: JournalType,
    pub reference: String,
    pub description: String,
    pub transaction_date: NaiveDate,
    pub postings: Vec<Posting>,
}

impl TransactionRequest {
    pub fn new(journal: JournalType, reference: impl Into<String>, transaction_date: NaiveDate) -> Self {
        Self {
            journal,
            reference: reference.into(),
            description: String::new(),
            transaction_date,
            postings: Vec::new(),
        }
    }

    /// Sets the description
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a debit posting
    pub fn debit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.postings.push(Posting::debit(account_id, amount));
        self
    }

    /// Adds a credit posting
    pub fn credit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.postings.push(Posting::credit(account_id, amount));
        self
    }

    /// Adds a custom posting
    pub fn posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    /// Adds several postings
    pub fn postings(mut self, postings: impl IntoIterator<Item = Posting>) -> Self {
        self.postings.extend(postings);
        self
    }
}

/// A posted, balanced group of entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTransaction {
    pub id: TransactionId,
    pub journal: JournalType,
    pub reference: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Business date, distinct from `created_at`
    pub transaction_date: NaiveDate,
    pub period_id: PeriodId,
    currency: Currency,
    entries: Vec<LedgerEntry>,
}

impl JournalTransaction {
    /// Assembles a transaction, checking its invariants
    ///
    /// # Errors
    ///
    /// - fewer than two entries
    /// - entries in more than one currency
    /// - entries that belong to another transaction
    /// - debits not equal to credits
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: TransactionId,
        journal: JournalType,
        reference: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
        transaction_date: NaiveDate,
        period_id: PeriodId,
        entries: Vec<LedgerEntry>,
    ) -> Result<Self, LedgerError> {
        if entries.len() < 2 {
            return Err(LedgerError::validation(
                "A transaction requires at least two entries",
            ));
        }
        if let Some(stray) = entries.iter().find(|e| e.transaction_id != id) {
            return Err(LedgerError::validation(format!(
                "Entry {} belongs to transaction {}",
                stray.id, stray.transaction_id
            )));
        }

        let currency = entries[0].amount.currency();
        let transaction = Self {
            id,
            journal,
            reference: reference.into(),
            description: description.into(),
            created_at,
            transaction_date,
            period_id,
            currency,
            entries,
        };
        transaction.ensure_balanced()?;
        Ok(transaction)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Currency shared by every entry
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Total debits and total credits
    pub fn totals(&self) -> Result<(Money, Money), LedgerError> {
        let currency = self.currency();
        let mut debits = Money::zero(currency);
        let mut credits = Money::zero(currency);

        for entry in &self.entries {
            match entry.direction {
                Direction::Debit => debits = debits.checked_add(&entry.amount)?,
                Direction::Credit => credits = credits.checked_add(&entry.amount)?,
            }
        }
        Ok((debits, credits))
    }

    /// True for the transaction posted by period closing
    pub fn is_closing(&self) -> bool {
        self.reference.starts_with(CLOSING_REFERENCE_PREFIX)
    }

    fn ensure_balanced(&self) -> Result<(), LedgerError> {
        let (debits, credits) = self.totals().map_err(|e| match e {
            LedgerError::Money(m) => LedgerError::CurrencyMismatch(format!(
                "all entries of a transaction must share one currency ({})",
                m
            )),
            other => other,
        })?;

        if debits.amount() - credits.amount() != Decimal::ZERO {
            return Err(LedgerError::UnbalancedTransaction {
                debits: debits.amount(),
                credits: credits.amount(),
            });
        }
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use core_kernel::EntryId;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn split_credit_legs_always_balance(
            parts in proptest::collection::vec(1i64..1_000_000i64, 1..8)
        ) {
            let txn = TransactionId::new();
            let now = Utc::now();
            let total: i64 = parts.iter().sum();
            let mut entries = vec![LedgerEntry::new(
                EntryId::new(), txn, AccountId::new(),
                Money::from_minor(total, Currency::EUR), Direction::Debit, "", now, now,
            ).unwrap()];
            for part in &parts {
                entries.push(LedgerEntry::new(
                    EntryId::new(), txn, AccountId::new(),
                    Money::from_minor(*part, Currency::EUR), Direction::Credit, "", now, now,
                ).unwrap());
            }

            let t = JournalTransaction::new(
                txn, JournalType::General, "P", "", now,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), PeriodId::new(), entries,
            ).unwrap();
            let (debits, credits) = t.totals().unwrap();
            prop_assert_eq!(debits, credits);
        }

        #[test]
        fn off_by_one_cent_is_unbalanced(amount in 2i64..1_000_000i64) {
            let txn = TransactionId::new();
            let now = Utc::now();
            let entries = vec![
                LedgerEntry::new(EntryId::new(), txn, AccountId::new(),
                    Money::from_minor(amount, Currency::EUR), Direction::Debit, "", now, now).unwrap(),
                LedgerEntry::new(EntryId::new(), txn, AccountId::new(),
                    Money::from_minor(amount - 1, Currency::EUR), Direction::Credit, "", now, now).unwrap(),
            ];
            let result = JournalTransaction::new(
                txn, JournalType::General, "P", "", now,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), PeriodId::new(), entries,
            );
            let is_unbalanced = matches!(result, Err(LedgerError::UnbalancedTransaction { .. }));
            prop_assert!(is_unbalanced);
        }
    }
}
