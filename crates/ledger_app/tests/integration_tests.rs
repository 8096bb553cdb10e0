//! End-to-end tests: capital, invoicing, settlement, stored credit and
//! year-end closing on one ledger

use config::Config;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::{Currency, ErrorKind, FixedClock, SequentialIds};
use domain_ledger::{JournalType, LedgerError, PeriodStatus};
use domain_settlement::InvoiceStatus;
use ledger_app::{AppConfig, AppError, LedgerApp, RETAINED_EARNINGS_CODE};
use test_utils::{
    assert_money_eq, assert_money_zero, codes, date, init_test_tracing, MoneyFixtures,
    TemporalFixtures, TestLedger,
};

fn eur(amount: rust_decimal::Decimal) -> core_kernel::Money {
    MoneyFixtures::eur(amount)
}

mod trading_year {
    use super::*;

    #[test]
    fn test_capital_invoice_overpayment_credit_and_close() {
        init_test_tracing();
        let t = TestLedger::without_period();
        let fy = t.create_period("FY2025", TemporalFixtures::fy2025_start(), TemporalFixtures::fy2025_end());

        // capital
        t.post("CAPITAL-2025", date(2025, 1, 2), codes::BANK, codes::CAPITAL, eur(dec!(100.00)));
        assert_money_eq(&t.balance(codes::BANK), &eur(dec!(100.00)));
        assert_money_eq(&t.balance(codes::CAPITAL), &eur(dec!(100.00)));

        // first invoice
        let customer = t.customer();
        let first = t.posted_invoice("INV-2025-001", customer, MoneyFixtures::eur_120());
        assert_money_eq(&t.balance(codes::RECEIVABLE), &eur(dec!(120.00)));
        assert_money_eq(&t.balance(codes::REVENUE), &eur(dec!(100.00)));
        assert_money_eq(&t.balance(codes::VAT_COLLECTED), &eur(dec!(20.00)));

        // overpayment
        t.settlement
            .record_payment(t.command(), first.id, codes::BANK, Some(eur(dec!(130.00))), date(2025, 2, 20))
            .unwrap();
        assert_money_zero(&t.balance(codes::RECEIVABLE));
        assert_money_eq(&t.balance(codes::CUSTOMER_ADVANCE), &eur(dec!(10.00)));
        let credits = t.settlement.open_credits(&customer).unwrap();
        assert_eq!(credits.len(), 1);
        assert_money_eq(&credits[0].remaining, &eur(dec!(10.00)));

        // credit applied to a second invoice
        let second = t.posted_invoice("INV-2025-002", customer, MoneyFixtures::eur_120());
        assert_money_eq(&t.balance(codes::RECEIVABLE), &eur(dec!(120.00)));
        t.settlement
            .apply_credit(t.command(), second.id, MoneyFixtures::eur_10(), date(2025, 2, 21))
            .unwrap();
        assert_money_zero(&t.balance(codes::CUSTOMER_ADVANCE));
        assert_money_eq(&t.balance(codes::RECEIVABLE), &eur(dec!(110.00)));
        assert!(t.settlement.open_credits(&customer).unwrap().is_empty());

        // income before closing
        let operating = t.statements.operating_income_statement(&fy).unwrap();
        let closed_view = t.statements.income_statement(&fy).unwrap();
        assert_money_eq(&operating.revenue, &eur(dec!(200.00)));
        assert_money_eq(&operating.net_income, &eur(dec!(200.00)));
        assert_eq!(operating, closed_view);

        // close the year
        let result = t
            .closing
            .close_period(fy.id, t.account_id(RETAINED_EARNINGS_CODE))
            .unwrap();
        assert_eq!(result.period.status, PeriodStatus::Closed);
        let closing = result.closing_transaction.unwrap();
        assert_eq!(closing.reference, "CLOSE-FY2025");
        assert_eq!(closing.journal, JournalType::Adjustment);
        assert_money_zero(&t.balance(codes::REVENUE));
        assert_money_eq(&t.balance(codes::RETAINED_EARNINGS), &eur(dec!(200.00)));

        let after = t.statements.income_statement(&result.period).unwrap();
        assert_money_zero(&after.revenue);
        assert_money_zero(&after.net_income);
        let operating = t.statements.operating_income_statement(&result.period).unwrap();
        assert_money_eq(&operating.revenue, &eur(dec!(200.00)));
        assert_money_eq(&operating.net_income, &eur(dec!(200.00)));

        let sheet = t.statements.balance_sheet(&result.period).unwrap();
        assert_money_eq(&sheet.total_assets, &eur(dec!(340.00)));
        assert_money_eq(&sheet.total_liabilities, &eur(dec!(40.00)));
        assert_money_eq(&sheet.total_equity, &eur(dec!(300.00)));
        assert!(sheet.is_balanced());

        let trial = t.statements.trial_balance(t.ledger_id, &result.period).unwrap();
        let codes_in_order: Vec<&str> = trial.iter().map(|row| row.code.as_str()).collect();
        let mut sorted = codes_in_order.clone();
        sorted.sort();
        assert_eq!(codes_in_order, sorted);
    }

    #[test]
    fn test_closed_year_refuses_postings() {
        let t = TestLedger::without_period();
        let fy = t.create_period("FY2025", TemporalFixtures::fy2025_start(), TemporalFixtures::fy2025_end());
        t.create_period("FY2026", TemporalFixtures::fy2026_start(), date(2026, 12, 31));
        t.closing
            .close_period(fy.id, t.account_id(RETAINED_EARNINGS_CODE))
            .unwrap();

        let customer = t.customer();
        let late = t
            .invoice("INV-LATE", customer)
            .issued_on(date(2025, 12, 30))
            .due_on(date(2026, 1, 30))
            .standard(eur(dec!(60)))
            .build();
        t.invoices.register(&late).unwrap();
        let err = t.invoices.post_invoice(late.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(t.settlement.invoice(late.id).unwrap().status, InvoiceStatus::Draft);
        assert!(t.ledger.transactions_in_journal(JournalType::Sales).unwrap().is_empty());

        let next = t
            .invoice("INV-2026-001", customer)
            .issued_on(date(2026, 1, 5))
            .due_on(date(2026, 2, 5))
            .standard(eur(dec!(60)))
            .build();
        t.invoices.register(&next).unwrap();
        t.invoices.post_invoice(next.id).unwrap();
        assert_money_eq(&t.balance(codes::RECEIVABLE), &eur(dec!(60)));
    }

    #[test]
    fn test_replayed_payment_after_close_is_still_a_replay() {
        let t = TestLedger::without_period();
        let fy = t.create_period("FY2025", TemporalFixtures::fy2025_start(), TemporalFixtures::fy2025_end());
        let invoice = t.posted_invoice("INV-1", t.customer(), eur(dec!(120)));
        let command = t.command();
        let paid = t
            .settlement
            .record_payment(command, invoice.id, codes::BANK, None, date(2025, 3, 1))
            .unwrap();

        t.closing
            .close_period(fy.id, t.account_id(RETAINED_EARNINGS_CODE))
            .unwrap();

        let replayed = t
            .settlement
            .record_payment(command, invoice.id, codes::BANK, None, date(2025, 3, 1))
            .unwrap();
        assert_eq!(paid, replayed);
        assert_eq!(t.ledger.transactions_in_journal(JournalType::Bank).unwrap().len(), 1);
    }
}

mod wiring {
    use super::*;

    #[test]
    fn test_configured_codes_drive_the_chart_and_settlement() {
        let config = AppConfig::from_builder(
            Config::builder()
                .set_override("settlement.accounts.bank", "512100")
                .unwrap()
                .set_override("settlement.vat_rate", "0.10")
                .unwrap(),
        )
        .unwrap();
        let app = LedgerApp::with_collaborators(
            config,
            Arc::new(FixedClock::at(TemporalFixtures::clock_start())),
            Arc::new(SequentialIds::new()),
        );
        let ledger_id = app.new_ledger_id();
        let chart = app.open_standard_chart(ledger_id).unwrap();
        assert!(chart.iter().any(|a| a.code == "512100"));
        assert!(chart.iter().all(|a| a.code != codes::BANK));
        assert!(chart.iter().all(|a| a.currency == Currency::EUR));

        app.ledger
            .create_period(ledger_id, "FY2025", TemporalFixtures::fy2025_start(), TemporalFixtures::fy2025_end())
            .unwrap();
        let invoice = test_utils::TestInvoiceBuilder::new(app.ids.next_id(), ledger_id, app_customer(&app))
            .standard(eur(dec!(110.00)))
            .build();
        app.invoices.register(&invoice).unwrap();
        app.invoices.post_invoice(invoice.id).unwrap();

        let vat = app.ledger.account_by_code(ledger_id, codes::VAT_COLLECTED).unwrap();
        assert_money_eq(&app.ledger.get_balance(vat.id).unwrap(), &eur(dec!(10.00)));

        app.settlement
            .record_payment(app.ids.next_id(), invoice.id, "512100", None, date(2025, 2, 1))
            .unwrap();
        let bank = app.ledger.account_by_code(ledger_id, "512100").unwrap();
        assert_money_eq(&app.ledger.get_balance(bank.id).unwrap(), &eur(dec!(110.00)));
    }

    #[test]
    fn test_errors_keep_their_kind() {
        let t = TestLedger::new();
        let missing = t.ledger.account_by_code(t.ledger_id, "9999").unwrap_err();
        assert!(matches!(missing, LedgerError::AccountNotFound(_)));

        let err: AppError = missing.into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let config_err = AppConfig::from_builder(
            Config::builder().set_override("currency", "XYZ").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(config_err, AppError::Config(_)));
        assert_eq!(config_err.kind(), ErrorKind::Validation);
    }

    fn app_customer(app: &LedgerApp) -> domain_settlement::Counterparty {
        domain_settlement::Counterparty::Customer(app.ids.next_id())
    }
}
