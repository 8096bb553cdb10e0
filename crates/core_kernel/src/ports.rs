//! Ports and Adapters Infrastructure
//!
//! This module provides the foundational types for implementing the hexagonal
//! architecture (ports and adapters) pattern across the domain crates.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            Engines (posting, closing, settlement)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Repository port traits                      │
//! │  Defined in each domain crate, depend only on core_kernel    │
//! └─────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │
//!                   ┌──────────┴──────────┐
//!                   │   In-memory adapter  │
//!                   │    (infra_memory)    │
//!                   └─────────────────────┘
//! ```
//!
//! Repository calls are synchronous; an adapter only has to guarantee
//! read-your-writes within one call chain.

use std::fmt;
use thiserror::Error;

use crate::error::ErrorKind;

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// ensuring consistent error handling across adapters.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if this error indicates a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }

    /// Classifies this error for callers
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortError::NotFound { .. } => ErrorKind::NotFound,
            PortError::Validation { .. } => ErrorKind::Validation,
            PortError::Conflict { .. } => ErrorKind::StateConflict,
            PortError::Internal { .. } => ErrorKind::Infrastructure,
        }
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so that they can be shared between
/// threads behind an `Arc`.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_kinds() {
        assert_eq!(PortError::not_found("Account", "ACC-1").kind(), ErrorKind::NotFound);
        assert_eq!(PortError::validation("blank").kind(), ErrorKind::Validation);
        assert_eq!(PortError::conflict("dup").kind(), ErrorKind::StateConflict);
        assert_eq!(PortError::internal("poisoned").kind(), ErrorKind::Infrastructure);
    }

    #[test]
    fn test_not_found_message() {
        let err = PortError::not_found("Invoice", "INV-42");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: Invoice with id INV-42");
    }
}
