//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than a bare `assert_eq!`.

use core_kernel::{AccountId, Money};
use domain_ledger::{JournalTransaction, LedgerEngine};
use rust_decimal::Decimal;

/// Asserts that two Money values are equal, currency included
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Money amounts differ: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts an account's lifetime balance, in the account's own currency
///
/// # Panics
///
/// Panics if the balance cannot be read or differs from `expected`
pub fn assert_balance(engine: &LedgerEngine, account_id: AccountId, expected: Decimal) {
    let balance = engine
        .get_balance(account_id)
        .unwrap_or_else(|e| panic!("Balance of {} unavailable: {}", account_id, e));
    assert_eq!(
        balance.amount(),
        expected,
        "Balance of {} is {}, expected {}",
        account_id,
        balance,
        expected
    );
}

/// Asserts that a posted transaction's debits equal its credits
pub fn assert_transaction_balanced(transaction: &JournalTransaction) {
    let (debits, credits) = transaction.totals().unwrap();
    assert_eq!(
        debits, credits,
        "Transaction {} is unbalanced: debits={}, credits={}",
        transaction.reference, debits, credits
    );
}
