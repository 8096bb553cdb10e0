//! Ledger Domain - Double-Entry Posting Engine
//!
//! This crate implements a strict double-entry bookkeeping core: a chart of
//! accounts, accounting periods, immutable ledger entries grouped into
//! journal transactions, period closing and read-side statements.
//!
//! # Double-Entry Accounting Principles
//!
//! Every financial transaction creates balanced debits and credits:
//! - Debits increase asset/expense accounts
//! - Credits increase liability/equity/income accounts
//! - The sum of all debits must equal the sum of all credits
//!
//! # Account Types
//!
//! - **Assets**: Bank, Receivables, VAT deductible, Supplier advances
//! - **Liabilities**: Payables, VAT collected, Customer advances
//! - **Equity**: Capital, Retained Earnings
//! - **Income**: Sales revenue
//! - **Expenses**: Purchases, Subcontracting
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{JournalType, LedgerEngine, TransactionRequest};
//!
//! let request = TransactionRequest::new(JournalType::General, "CAP-001", date)
//!     .described("Initial capital")
//!     .debit(bank, capital)
//!     .credit(equity, capital);
//!
//! let transaction = engine.post_journal_transaction(request)?;
//! ```

pub mod account;
pub mod period;
pub mod entry;
pub mod transaction;
pub mod ports;
pub mod ledger;
pub mod closing;
pub mod statements;
pub mod error;

pub use account::{Account, AccountType};
pub use period::{AccountingPeriod, PeriodStatus};
pub use entry::{Direction, LedgerEntry};
pub use transaction::{
    JournalTransaction, JournalType, Posting, TransactionRequest, CLOSING_REFERENCE_PREFIX,
};
pub use ports::{
    AccountRepository, JournalTransactionRepository, LedgerEntryRepository, PeriodRepository,
};
pub use ledger::{LedgerEngine, LedgerRepositories};
pub use closing::{ClosingResult, PeriodClosing};
pub use statements::{BalanceSheet, FinancialStatements, IncomeStatement, TrialBalanceRow};
pub use error::LedgerError;
