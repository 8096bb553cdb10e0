//! Repository ports of the settlement domain

use core_kernel::{CommandId, CreditId, DomainPort, InvoiceId, LedgerId, PortError};
use crate::credit::StoredCredit;
use crate::idempotency::IdempotencyRecord;
use crate::invoice::{Counterparty, Invoice};
use crate::payment::Payment;

/// Completed-command records
pub trait IdempotencyRepository: DomainPort {
    fn find(&self, command_id: CommandId) -> Result<Option<IdempotencyRecord>, PortError>;

    fn save(&self, record: &IdempotencyRecord) -> Result<(), PortError>;
}

/// Invoice storage
pub trait InvoiceRepository: DomainPort {
    /// Inserts or replaces an invoice
    fn save(&self, invoice: &Invoice) -> Result<(), PortError>;

    fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, PortError>;

    fn find_by_number(&self, ledger_id: LedgerId, number: &str) -> Result<Option<Invoice>, PortError>;

    fn find_by_counterparty(&self, counterparty: &Counterparty) -> Result<Vec<Invoice>, PortError>;
}

/// Payment history
pub trait PaymentRepository: DomainPort {
    fn save(&self, payment: &Payment) -> Result<(), PortError>;

    fn find_by_invoice(&self, invoice_id: InvoiceId) -> Result<Vec<Payment>, PortError>;
}

/// Customer credit and supplier advance pools
pub trait CreditRepository: DomainPort {
    /// Next creation sequence; strictly increasing across calls
    fn next_sequence(&self) -> Result<u64, PortError>;

    /// Inserts or replaces a credit
    fn save(&self, credit: &StoredCredit) -> Result<(), PortError>;

    fn find_by_id(&self, id: CreditId) -> Result<Option<StoredCredit>, PortError>;

    /// Credits with a positive remaining amount, ordered by sequence
    fn find_open_by_counterparty(
        &self,
        counterparty: &Counterparty,
    ) -> Result<Vec<StoredCredit>, PortError>;

    fn find_by_source_command(&self, command_id: CommandId) -> Result<Option<StoredCredit>, PortError>;
}
