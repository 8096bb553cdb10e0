//! Read-side financial statements
//!
//! Pure folds over the engine's balance queries. Closed results include
//! the `CLOSE-` adjustment and therefore report zero once a period is
//! closed; operating results exclude it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use core_kernel::{AccountId, Currency, LedgerId, Money};
use crate::account::{Account, AccountType};
use crate::entry::Direction;
use crate::error::LedgerError;
use crate::ledger::LedgerEngine;
use crate::period::AccountingPeriod;

/// One row of a trial balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_id: AccountId,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub period_name: String,
    pub revenue: Money,
    pub expenses: Money,
    pub net_income: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub period_name: String,
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub total_equity: Money,
    /// Assets minus liabilities
    pub derived_equity: Money,
}

impl BalanceSheet {
    /// True when recorded equity matches assets minus liabilities
    pub fn is_balanced(&self) -> bool {
        self.total_equity == self.derived_equity
    }
}

/// Statement builder over one ledger
pub struct FinancialStatements {
    engine: Arc<LedgerEngine>,
    reporting_currency: Currency,
}

impl FinancialStatements {
    /// `reporting_currency` is used when a statement has no data at all
    pub fn new(engine: Arc<LedgerEngine>, reporting_currency: Currency) -> Self {
        Self {
            engine,
            reporting_currency,
        }
    }

    /// One row per account of the ledger, sorted by code
    #[instrument(skip(self, period), fields(period = %period.name))]
    pub fn trial_balance(
        &self,
        ledger_id: LedgerId,
        period: &AccountingPeriod,
    ) -> Result<Vec<TrialBalanceRow>, LedgerError> {
        self.engine
            .list_accounts(ledger_id)?
            .into_iter()
            .map(|account| {
                let balance = self.engine.get_balance_for_period(account.id, period)?;
                Ok(TrialBalanceRow {
                    account_id: account.id,
                    code: account.code,
                    name: account.name,
                    account_type: account.account_type,
                    balance,
                })
            })
            .collect()
    }

    /// Income statement from period balances, closing entries included
    #[instrument(skip(self, period), fields(period = %period.name))]
    pub fn income_statement(&self, period: &AccountingPeriod) -> Result<IncomeStatement, LedgerError> {
        let balances = self.period_balances(period)?;
        let currency = self.statement_currency(balances.iter().map(|(_, m)| m))?;
        let revenue = total(&balances, AccountType::Income, currency)?;
        let expenses = total(&balances, AccountType::Expense, currency)?;
        income(period, revenue, expenses)
    }

    /// Income statement from the period's transactions, closing entries
    /// excluded
    #[instrument(skip(self, period), fields(period = %period.name))]
    pub fn operating_income_statement(
        &self,
        period: &AccountingPeriod,
    ) -> Result<IncomeStatement, LedgerError> {
        let accounts: HashMap<AccountId, Account> = self
            .engine
            .list_accounts(period.ledger_id)?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut revenue: Vec<Money> = Vec::new();
        let mut expenses: Vec<Money> = Vec::new();
        for transaction in self.engine.transactions_for_period(period.id)? {
            if transaction.is_closing() {
                continue;
            }
            for entry in transaction.entries() {
                let Some(account) = accounts.get(&entry.account_id) else {
                    continue;
                };
                match account.account_type {
                    AccountType::Income => revenue.push(match entry.direction {
                        Direction::Credit => entry.amount,
                        Direction::Debit => entry.amount.negate(),
                    }),
                    AccountType::Expense => expenses.push(match entry.direction {
                        Direction::Debit => entry.amount,
                        Direction::Credit => entry.amount.negate(),
                    }),
                    _ => {}
                }
            }
        }

        let currency = self.statement_currency(revenue.iter().chain(expenses.iter()))?;
        let revenue = Money::sum(&revenue, currency)?;
        let expenses = Money::sum(&expenses, currency)?;
        income(period, revenue, expenses)
    }

    /// Balance sheet from period balances
    #[instrument(skip(self, period), fields(period = %period.name))]
    pub fn balance_sheet(&self, period: &AccountingPeriod) -> Result<BalanceSheet, LedgerError> {
        let balances = self.period_balances(period)?;
        let currency = self.statement_currency(balances.iter().map(|(_, m)| m))?;
        let total_assets = total(&balances, AccountType::Asset, currency)?;
        let total_liabilities = total(&balances, AccountType::Liability, currency)?;
        let total_equity = total(&balances, AccountType::Equity, currency)?;
        let derived_equity = total_assets.checked_sub(&total_liabilities)?;

        Ok(BalanceSheet {
            period_name: period.name.clone(),
            total_assets,
            total_liabilities,
            total_equity,
            derived_equity,
        })
    }

    fn period_balances(
        &self,
        period: &AccountingPeriod,
    ) -> Result<Vec<(AccountType, Money)>, LedgerError> {
        self.engine
            .list_accounts(period.ledger_id)?
            .into_iter()
            .map(|account| {
                let balance = self.engine.get_balance_for_period(account.id, period)?;
                Ok((account.account_type, balance))
            })
            .collect()
    }

    /// The single currency of `amounts`, or the reporting currency if empty
    fn statement_currency<'a>(
        &self,
        amounts: impl Iterator<Item = &'a Money>,
    ) -> Result<Currency, LedgerError> {
        let mut currency: Option<Currency> = None;
        for amount in amounts {
            match currency {
                None => currency = Some(amount.currency()),
                Some(c) if c != amount.currency() => {
                    return Err(LedgerError::CurrencyMismatch(format!(
                        "Mixed currencies in statement: {} and {}",
                        c,
                        amount.currency()
                    )))
                }
                Some(_) => {}
            }
        }
        Ok(currency.unwrap_or(self.reporting_currency))
    }
}

fn total(
    balances: &[(AccountType, Money)],
    account_type: AccountType,
    currency: Currency,
) -> Result<Money, LedgerError> {
    let selected = balances
        .iter()
        .filter(|(t, _)| *t == account_type)
        .map(|(_, m)| m);
    Ok(Money::sum(selected, currency)?)
}

fn income(
    period: &AccountingPeriod,
    revenue: Money,
    expenses: Money,
) -> Result<IncomeStatement, LedgerError> {
    let net_income = revenue.checked_sub(&expenses)?;
    Ok(IncomeStatement {
        period_name: period.name.clone(),
        revenue,
        expenses,
        net_income,
    })
}
