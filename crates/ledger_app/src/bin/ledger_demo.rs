//! Ledger demo binary
//!
//! Opens a ledger with the standard chart, posts a capital contribution,
//! invoices a customer, settles it with an overpayment, applies the
//! resulting credit to a second invoice and closes the year.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin ledger-demo
//!
//! LEDGER_LOG_FORMAT=json LEDGER_TIMEZONE=Europe/Paris cargo run --bin ledger-demo
//! ```
//!
//! # Environment Variables
//!
//! * `LEDGER_LOG_LEVEL` - Log filter (default: info)
//! * `LEDGER_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! * `LEDGER_TIMEZONE` - IANA time zone for business dates (default: UTC)
//! * `LEDGER_CURRENCY` - Ledger currency (default: EUR)
//! * `LEDGER_SETTLEMENT__VAT_RATE` - VAT rate as a fraction (default: 0.20)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{CommandId, CustomerId, Money};
use domain_ledger::{JournalType, TransactionRequest};
use domain_settlement::{Counterparty, Invoice, InvoiceLine};
use ledger_app::{init_tracing, AppConfig, LedgerApp, CAPITAL_CODE, RETAINED_EARNINGS_CODE};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("loading configuration")?;
    init_tracing(&config.log_level, config.log_format)?;

    tracing::info!(
        ledger = %config.ledger_name,
        timezone = %config.timezone,
        currency = %config.currency,
        "Starting ledger demo"
    );

    let app = LedgerApp::new(config);
    run(&app)?;

    tracing::info!("Ledger demo complete");
    Ok(())
}

fn run(app: &LedgerApp) -> Result<()> {
    let currency = app.config().currency;
    let accounts = &app.config().settlement.accounts;
    let money = |amount| Money::new(amount, currency);
    let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).context("invalid demo date");

    let ledger_id = app.new_ledger_id();
    app.open_standard_chart(ledger_id)?;
    let period = app
        .ledger
        .create_period(ledger_id, "FY2025", date(1, 1)?, date(12, 31)?)?;

    let bank = app.ledger.account_by_code(ledger_id, &accounts.bank)?;
    let capital = app.ledger.account_by_code(ledger_id, CAPITAL_CODE)?;
    app.ledger.post_journal_transaction(
        TransactionRequest::new(JournalType::General, "CAPITAL-2025", date(1, 2)?)
            .described("Initial capital")
            .debit(bank.id, money(dec!(100.00)))
            .credit(capital.id, money(dec!(100.00))),
    )?;

    let customer = Counterparty::Customer(app.ids.next_id::<CustomerId>());
    let first = Invoice::draft(
        app.ids.next_id(),
        ledger_id,
        "INV-2025-001",
        customer,
        date(2, 1)?,
        date(3, 1)?,
        vec![InvoiceLine::standard("Consulting", money(dec!(120.00)))?],
    )?;
    let second = Invoice::draft(
        app.ids.next_id(),
        ledger_id,
        "INV-2025-002",
        customer,
        date(2, 15)?,
        date(3, 15)?,
        vec![InvoiceLine::standard("Consulting", money(dec!(120.00)))?],
    )?;
    for invoice in [&first, &second] {
        app.invoices.register(invoice)?;
        app.invoices.post_invoice(invoice.id)?;
    }

    app.settlement.record_payment(
        app.ids.next_id::<CommandId>(),
        first.id,
        &accounts.bank,
        Some(money(dec!(130.00))),
        date(2, 20)?,
    )?;
    app.settlement
        .apply_credit(app.ids.next_id::<CommandId>(), second.id, money(dec!(10.00)), date(2, 21)?)?;

    let remaining = app.settlement.remaining_balance(second.id)?;
    tracing::info!(invoice = %second.number, remaining = %remaining, "Second invoice after credit");

    let retained = app.ledger.account_by_code(ledger_id, RETAINED_EARNINGS_CODE)?;
    let operating = app.statements.operating_income_statement(&period)?;
    let closed = app.closing.close_period(period.id, retained.id)?;
    let sheet = app.statements.balance_sheet(&closed.period)?;

    tracing::info!(
        revenue = %operating.revenue,
        net_income = %operating.net_income,
        "Operating income"
    );
    tracing::info!(
        assets = %sheet.total_assets,
        liabilities = %sheet.total_liabilities,
        equity = %sheet.total_equity,
        balanced = sheet.is_balanced(),
        "Balance sheet after closing"
    );

    for row in app.statements.trial_balance(ledger_id, &closed.period)? {
        tracing::info!(code = %row.code, name = %row.name, balance = %row.balance, "Trial balance");
    }
    Ok(())
}
