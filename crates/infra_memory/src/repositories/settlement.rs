//! Settlement repositories

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use core_kernel::{CommandId, CreditId, DomainPort, InvoiceId, LedgerId, PortError};
use domain_settlement::{
    Counterparty, CreditRepository, IdempotencyRecord, IdempotencyRepository, Invoice,
    InvoiceRepository, Payment, PaymentRepository, StoredCredit,
};

use super::{read, write};

/// Completed commands keyed by command id
#[derive(Debug, Default)]
pub struct InMemoryIdempotencyRepository {
    records: RwLock<HashMap<CommandId, IdempotencyRecord>>,
}

impl InMemoryIdempotencyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryIdempotencyRepository {}

impl IdempotencyRepository for InMemoryIdempotencyRepository {
    fn find(&self, command_id: CommandId) -> Result<Option<IdempotencyRecord>, PortError> {
        Ok(read(&self.records, "idempotency")?.get(&command_id).cloned())
    }

    fn save(&self, record: &IdempotencyRecord) -> Result<(), PortError> {
        let mut records = write(&self.records, "idempotency")?;
        if records.contains_key(&record.command_id) {
            return Err(PortError::conflict(format!(
                "Command {} already completed",
                record.command_id
            )));
        }
        records.insert(record.command_id, record.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryInvoiceRepository {
    invoices: RwLock<HashMap<InvoiceId, Invoice>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryInvoiceRepository {}

impl InvoiceRepository for InMemoryInvoiceRepository {
    fn save(&self, invoice: &Invoice) -> Result<(), PortError> {
        write(&self.invoices, "invoice")?.insert(invoice.id, invoice.clone());
        Ok(())
    }

    fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, PortError> {
        Ok(read(&self.invoices, "invoice")?.get(&id).cloned())
    }

    fn find_by_number(&self, ledger_id: LedgerId, number: &str) -> Result<Option<Invoice>, PortError> {
        Ok(read(&self.invoices, "invoice")?
            .values()
            .find(|i| i.ledger_id == ledger_id && i.number == number)
            .cloned())
    }

    fn find_by_counterparty(&self, counterparty: &Counterparty) -> Result<Vec<Invoice>, PortError> {
        let mut invoices: Vec<Invoice> = read(&self.invoices, "invoice")?
            .values()
            .filter(|i| &i.counterparty == counterparty)
            .cloned()
            .collect();
        invoices.sort_by(|a, b| a.issue_date.cmp(&b.issue_date).then_with(|| a.number.cmp(&b.number)));
        Ok(invoices)
    }
}

/// Payment history in recording order
#[derive(Debug, Default)]
pub struct InMemoryPaymentRepository {
    payments: RwLock<Vec<Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryPaymentRepository {}

impl PaymentRepository for InMemoryPaymentRepository {
    fn save(&self, payment: &Payment) -> Result<(), PortError> {
        let mut payments = write(&self.payments, "payment")?;
        if payments.iter().any(|p| p.id == payment.id) {
            return Err(PortError::conflict(format!("Payment {} already exists", payment.id)));
        }
        payments.push(payment.clone());
        Ok(())
    }

    fn find_by_invoice(&self, invoice_id: InvoiceId) -> Result<Vec<Payment>, PortError> {
        Ok(read(&self.payments, "payment")?
            .iter()
            .filter(|p| p.invoice_id == invoice_id)
            .cloned()
            .collect())
    }
}

/// Stored credits with a monotonic creation sequence
#[derive(Debug, Default)]
pub struct InMemoryCreditRepository {
    credits: RwLock<HashMap<CreditId, StoredCredit>>,
    sequence: AtomicU64,
}

impl InMemoryCreditRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryCreditRepository {}

impl CreditRepository for InMemoryCreditRepository {
    fn next_sequence(&self) -> Result<u64, PortError> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn save(&self, credit: &StoredCredit) -> Result<(), PortError> {
        write(&self.credits, "credit")?.insert(credit.id, credit.clone());
        Ok(())
    }

    fn find_by_id(&self, id: CreditId) -> Result<Option<StoredCredit>, PortError> {
        Ok(read(&self.credits, "credit")?.get(&id).cloned())
    }

    fn find_open_by_counterparty(
        &self,
        counterparty: &Counterparty,
    ) -> Result<Vec<StoredCredit>, PortError> {
        let mut open: Vec<StoredCredit> = read(&self.credits, "credit")?
            .values()
            .filter(|c| &c.counterparty == counterparty && c.is_open())
            .cloned()
            .collect();
        open.sort_by_key(|c| c.sequence);
        Ok(open)
    }

    fn find_by_source_command(&self, command_id: CommandId) -> Result<Option<StoredCredit>, PortError> {
        Ok(read(&self.credits, "credit")?
            .values()
            .find(|c| c.source_command_id == command_id)
            .cloned())
    }
}
