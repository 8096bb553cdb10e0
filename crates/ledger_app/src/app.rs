//! Engine wiring
//!
//! Builds every engine over one shared [`InMemoryStore`] with injected
//! clock and id generator.

use std::sync::Arc;
use tracing::{debug, info};

use core_kernel::{Clock, IdGenerator, LedgerId, RandomIds, SystemClock};
use domain_ledger::{
    Account, AccountType, FinancialStatements, LedgerEngine, LedgerError, PeriodClosing,
};
use domain_settlement::{
    IdempotencyExecutor, InvoicePosting, SettlementConfig, SettlementEngine,
};
use infra_memory::InMemoryStore;

use crate::config::AppConfig;
use crate::error::AppError;

/// One account of the standard chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartAccount {
    pub code: String,
    pub name: &'static str,
    pub account_type: AccountType,
}

impl ChartAccount {
    fn new(code: impl Into<String>, name: &'static str, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name,
            account_type,
        }
    }
}

/// Code of the owner's capital account
pub const CAPITAL_CODE: &str = "1010";
/// Code of the retained earnings account used by period closing
pub const RETAINED_EARNINGS_CODE: &str = "1100";

/// Accounts needed by settlement and invoice posting, plus capital and
/// retained earnings
pub fn standard_chart(settlement: &SettlementConfig) -> Vec<ChartAccount> {
    let codes = &settlement.accounts;
    vec![
        ChartAccount::new(CAPITAL_CODE, "Capital", AccountType::Equity),
        ChartAccount::new(RETAINED_EARNINGS_CODE, "Retained earnings", AccountType::Equity),
        ChartAccount::new(&codes.bank, "Bank", AccountType::Asset),
        ChartAccount::new(&codes.receivable, "Accounts receivable", AccountType::Asset),
        ChartAccount::new(&codes.revenue, "Sales revenue", AccountType::Income),
        ChartAccount::new(&codes.vat_collected, "VAT collected", AccountType::Liability),
        ChartAccount::new(&codes.payable, "Suppliers payable", AccountType::Liability),
        ChartAccount::new(&codes.expense, "Subcontracting", AccountType::Expense),
        ChartAccount::new(&codes.vat_deductible, "VAT deductible", AccountType::Asset),
        ChartAccount::new(&codes.customer_advance, "Customer advances", AccountType::Liability),
        ChartAccount::new(&codes.supplier_advance, "Supplier advances", AccountType::Asset),
    ]
}

/// The ledger and settlement engines wired over one in-memory store
pub struct LedgerApp {
    pub store: InMemoryStore,
    pub ledger: Arc<LedgerEngine>,
    pub closing: PeriodClosing,
    pub statements: FinancialStatements,
    pub settlement: SettlementEngine,
    pub invoices: InvoicePosting,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    config: AppConfig,
}

impl LedgerApp {
    /// Wires the application with the system clock and random identifiers
    pub fn new(config: AppConfig) -> Self {
        Self::with_collaborators(config, Arc::new(SystemClock), Arc::new(RandomIds))
    }

    /// Wires the application with explicit clock and id generator
    pub fn with_collaborators(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let store = InMemoryStore::new();
        let ledger = Arc::new(LedgerEngine::new(
            store.ledger_repositories(),
            clock.clone(),
            ids.clone(),
            config.timezone,
        ));
        let executor = Arc::new(IdempotencyExecutor::new(
            store.idempotency_repository(),
            clock.clone(),
        ));
        let settlement = SettlementEngine::new(
            ledger.clone(),
            store.settlement_repositories(),
            executor,
            clock.clone(),
            ids.clone(),
            config.settlement.clone(),
        );
        let invoices = InvoicePosting::new(
            ledger.clone(),
            store.invoice_repository(),
            config.settlement.clone(),
        );

        debug!(timezone = %config.timezone, currency = %config.currency, "Wired ledger application");
        Self {
            closing: PeriodClosing::new(ledger.clone()),
            statements: FinancialStatements::new(ledger.clone(), config.currency),
            store,
            ledger,
            settlement,
            invoices,
            clock,
            ids,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns a fresh ledger identifier
    pub fn new_ledger_id(&self) -> LedgerId {
        self.ids.next_id()
    }

    /// Opens every account of the standard chart in `ledger_id`
    ///
    /// Accounts whose code already exists are returned unchanged, so the
    /// call can be repeated.
    pub fn open_standard_chart(&self, ledger_id: LedgerId) -> Result<Vec<Account>, AppError> {
        let mut accounts = Vec::new();
        for entry in standard_chart(&self.config.settlement) {
            let account = match self.ledger.account_by_code(ledger_id, &entry.code) {
                Ok(existing) => existing,
                Err(LedgerError::AccountNotFound(_)) => self.ledger.open_account(
                    ledger_id,
                    &entry.code,
                    entry.name,
                    entry.account_type,
                    self.config.currency,
                )?,
                Err(e) => return Err(e.into()),
            };
            accounts.push(account);
        }
        info!(ledger = %ledger_id, accounts = accounts.len(), "Standard chart ready");
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_chart_codes_are_unique() {
        let chart = standard_chart(&SettlementConfig::default());
        let codes: HashSet<&str> = chart.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes.len(), chart.len());
    }

    #[test]
    fn test_open_standard_chart_is_repeatable() {
        let app = LedgerApp::new(AppConfig::default());
        let ledger_id = app.new_ledger_id();

        let first = app.open_standard_chart(ledger_id).unwrap();
        let second = app.open_standard_chart(ledger_id).unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(app.ledger.list_accounts(ledger_id).unwrap().len(), first.len());
        assert!(first.iter().zip(&second).all(|(a, b)| a.id == b.id));
    }
}
