//! Deterministic test ledger
//!
//! A [`LedgerApp`] with a fixed clock, sequential identifiers, one EUR
//! ledger carrying the standard chart and, by default, a catch-all `TEST`
//! period covering 2000-01-01..2100-12-31.

use chrono::NaiveDate;
use std::ops::Deref;
use std::sync::Arc;

use core_kernel::{
    AccountId, CommandId, Currency, CustomerId, FixedClock, LedgerId, Money, SequentialIds,
    SupplierId,
};
use domain_ledger::{
    Account, AccountType, AccountingPeriod, JournalTransaction, JournalType, TransactionRequest,
};
use domain_settlement::{Counterparty, Invoice, InvoiceLine};
use ledger_app::{AppConfig, LedgerApp, CAPITAL_CODE, RETAINED_EARNINGS_CODE};

use crate::builders::TestInvoiceBuilder;
use crate::fixtures::TemporalFixtures;

/// Account codes of the standard chart under the default configuration
pub mod codes {
    pub const BANK: &str = "5121";
    pub const CAPITAL: &str = "1010";
    pub const RETAINED_EARNINGS: &str = "1100";
    pub const RECEIVABLE: &str = "4110";
    pub const REVENUE: &str = "7060";
    pub const VAT_COLLECTED: &str = "4457";
    pub const PAYABLE: &str = "4010";
    pub const EXPENSE: &str = "6060";
    pub const VAT_DEDUCTIBLE: &str = "4456";
    pub const CUSTOMER_ADVANCE: &str = "4191";
    pub const SUPPLIER_ADVANCE: &str = "4091";
}

pub struct TestLedger {
    pub app: LedgerApp,
    pub ledger_id: LedgerId,
    /// The catch-all period, when one was created
    pub period: Option<AccountingPeriod>,
    pub clock: Arc<FixedClock>,
}

impl Deref for TestLedger {
    type Target = LedgerApp;

    fn deref(&self) -> &LedgerApp {
        &self.app
    }
}

impl Default for TestLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLedger {
    /// Standard chart plus the open `TEST` period
    pub fn new() -> Self {
        let mut ledger = Self::without_period();
        let period = ledger
            .ledger
            .create_period(
                ledger.ledger_id,
                "TEST",
                TemporalFixtures::test_period_start(),
                TemporalFixtures::test_period_end(),
            )
            .unwrap();
        ledger.period = Some(period);
        ledger
    }

    /// Standard chart only; tests create their own periods
    pub fn without_period() -> Self {
        let clock = Arc::new(FixedClock::at(TemporalFixtures::clock_start()));
        let app = LedgerApp::with_collaborators(
            AppConfig::default(),
            clock.clone(),
            Arc::new(SequentialIds::new()),
        );
        assert_eq!(app.config().settlement.accounts.bank, codes::BANK);
        assert_eq!(CAPITAL_CODE, codes::CAPITAL);
        assert_eq!(RETAINED_EARNINGS_CODE, codes::RETAINED_EARNINGS);

        let ledger_id = app.new_ledger_id();
        app.open_standard_chart(ledger_id).unwrap();
        Self {
            app,
            ledger_id,
            period: None,
            clock,
        }
    }

    /// The catch-all period; panics when built `without_period`
    pub fn test_period(&self) -> AccountingPeriod {
        let period = self.period.as_ref().expect("ledger built without a TEST period");
        self.ledger.period(period.id).unwrap()
    }

    pub fn create_period(&self, name: &str, start: NaiveDate, end: NaiveDate) -> AccountingPeriod {
        self.ledger.create_period(self.ledger_id, name, start, end).unwrap()
    }

    pub fn account(&self, code: &str) -> Account {
        self.ledger.account_by_code(self.ledger_id, code).unwrap()
    }

    pub fn account_id(&self, code: &str) -> AccountId {
        self.account(code).id
    }

    /// Opens an extra EUR account
    pub fn open(&self, code: &str, name: &str, account_type: AccountType) -> Account {
        self.ledger
            .open_account(self.ledger_id, code, name, account_type, Currency::EUR)
            .unwrap()
    }

    pub fn balance(&self, code: &str) -> Money {
        self.ledger.get_balance(self.account_id(code)).unwrap()
    }

    /// Posts `Dr debit_code / Cr credit_code` in the General journal
    pub fn post(
        &self,
        reference: &str,
        date: NaiveDate,
        debit_code: &str,
        credit_code: &str,
        amount: Money,
    ) -> JournalTransaction {
        self.ledger
            .post_journal_transaction(
                TransactionRequest::new(JournalType::General, reference, date)
                    .debit(self.account_id(debit_code), amount)
                    .credit(self.account_id(credit_code), amount),
            )
            .unwrap()
    }

    pub fn command(&self) -> CommandId {
        self.ids.next_id()
    }

    pub fn customer(&self) -> Counterparty {
        Counterparty::Customer(self.ids.next_id::<CustomerId>())
    }

    pub fn supplier(&self) -> Counterparty {
        Counterparty::Supplier(self.ids.next_id::<SupplierId>())
    }

    /// Starts an invoice for this ledger
    pub fn invoice(&self, number: &str, counterparty: Counterparty) -> TestInvoiceBuilder {
        TestInvoiceBuilder::new(self.ids.next_id(), self.ledger_id, counterparty).number(number)
    }

    /// Registers and posts a single standard-rated line invoice
    pub fn posted_invoice(&self, number: &str, counterparty: Counterparty, gross: Money) -> Invoice {
        let invoice = self
            .invoice(number, counterparty)
            .line(InvoiceLine::standard("Services", gross).unwrap())
            .build();
        self.invoices.register(&invoice).unwrap();
        self.invoices.post_invoice(invoice.id).unwrap();
        self.settlement.invoice(invoice.id).unwrap()
    }
}
