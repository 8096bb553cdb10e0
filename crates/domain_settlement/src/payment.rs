//! Payment records
//!
//! A payment records the amount applied to one invoice. Excess cash is never
//! a payment; it becomes a stored credit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CommandId, InvoiceId, Money, PaymentId};

/// A settlement applied to an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    /// Invoice being paid
    pub invoice_id: InvoiceId,
    /// Amount applied to the invoice
    pub amount: Money,
    pub payment_date: NaiveDate,
    /// Bank account code, or a sentinel for credit-funded payments
    pub bank_account_code: String,
    /// Command that recorded the payment
    pub command_id: CommandId,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        id: PaymentId,
        invoice_id: InvoiceId,
        amount: Money,
        payment_date: NaiveDate,
        bank_account_code: impl Into<String>,
        command_id: CommandId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            invoice_id,
            amount,
            payment_date,
            bank_account_code: bank_account_code.into(),
            command_id,
            created_at,
        }
    }
}
