//! Settlement configuration

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::Rate;

/// Account codes used by the settlement and invoice-posting flows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementAccounts {
    /// Default bank account
    pub bank: String,
    /// Customer receivables
    pub receivable: String,
    /// Sales revenue
    pub revenue: String,
    pub vat_collected: String,
    /// Supplier payables
    pub payable: String,
    /// Purchase expense
    pub expense: String,
    pub vat_deductible: String,
    /// Customer credits (liability)
    pub customer_advance: String,
    /// Supplier advances (asset)
    pub supplier_advance: String,
}

impl Default for SettlementAccounts {
    fn default() -> Self {
        Self {
            bank: "5121".to_string(),
            receivable: "4110".to_string(),
            revenue: "7060".to_string(),
            vat_collected: "4457".to_string(),
            payable: "4010".to_string(),
            expense: "6060".to_string(),
            vat_deductible: "4456".to_string(),
            customer_advance: "4191".to_string(),
            supplier_advance: "4091".to_string(),
        }
    }
}

/// Settlement configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    pub accounts: SettlementAccounts,
    /// VAT rate applied to standard-rated invoice lines
    pub vat_rate: Rate,
    /// Bank code recorded on payments funded by customer credit
    pub credit_sentinel: String,
    /// Bank code recorded on payments funded by supplier advances
    pub advance_sentinel: String,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            accounts: SettlementAccounts::default(),
            vat_rate: Rate::new(dec!(0.20)),
            credit_sentinel: "CREDIT-4191".to_string(),
            advance_sentinel: "ADV-4091".to_string(),
        }
    }
}

impl SettlementConfig {
    /// True for a bank code marking a credit-funded payment
    pub fn is_sentinel(&self, bank_account_code: &str) -> bool {
        bank_account_code == self.credit_sentinel || bank_account_code == self.advance_sentinel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SettlementConfig::default();
        assert_eq!(config.accounts.bank, "5121");
        assert_eq!(config.accounts.customer_advance, "4191");
        assert_eq!(config.vat_rate.as_decimal(), dec!(0.20));
        assert!(config.is_sentinel("CREDIT-4191"));
        assert!(config.is_sentinel("ADV-4091"));
        assert!(!config.is_sentinel("5121"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: SettlementConfig =
            serde_json::from_str(r#"{"accounts": {"bank": "5122"}, "vat_rate": "0.055"}"#).unwrap();
        assert_eq!(config.accounts.bank, "5122");
        assert_eq!(config.accounts.receivable, "4110");
        assert_eq!(config.vat_rate.as_decimal(), dec!(0.055));
        assert_eq!(config.credit_sentinel, "CREDIT-4191");
    }
}
