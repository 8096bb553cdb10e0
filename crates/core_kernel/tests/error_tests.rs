//! Tests for core_kernel error types

use core_kernel::money::MoneyError;
use core_kernel::{ErrorKind, PortError};

#[test]
fn test_port_error_validation_carries_message() {
    let error = PortError::validation("Reference is required");

    match error {
        PortError::Validation { message, field } => {
            assert_eq!(message, "Reference is required");
            assert!(field.is_none());
        }
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_port_error_conflict() {
    let error = PortError::conflict("Idempotency record already exists");
    assert!(error.is_conflict());
    assert!(!error.is_not_found());
    assert_eq!(error.kind(), ErrorKind::StateConflict);
}

#[test]
fn test_only_infrastructure_is_not_a_caller_error() {
    assert!(ErrorKind::Validation.is_caller_error());
    assert!(ErrorKind::NotFound.is_caller_error());
    assert!(ErrorKind::StateConflict.is_caller_error());
    assert!(!ErrorKind::Infrastructure.is_caller_error());
}

#[test]
fn test_error_kind_display() {
    assert_eq!(ErrorKind::StateConflict.to_string(), "STATE_CONFLICT");
    assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
}

#[test]
fn test_money_error_messages() {
    let error = MoneyError::CurrencyMismatch("USD".to_string(), "EUR".to_string());
    assert_eq!(error.to_string(), "Currency mismatch: cannot operate on USD and EUR");
    assert_eq!(MoneyError::UnknownCurrency("XYZ".to_string()).to_string(), "Unknown currency: XYZ");
}
