//! Error taxonomy shared by every domain crate

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification of a failure, as seen by callers
///
/// Domain error enums map each variant onto one of these kinds so that
/// callers can decide how to react without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing or malformed input: blank field, non-positive amount,
    /// mismatched currency, too few postings
    Validation,
    /// An account, invoice, period or other entity does not exist
    NotFound,
    /// The current state forbids the operation: wrong status, insufficient
    /// credit, already-settled invoice
    StateConflict,
    /// The storage layer failed
    Infrastructure,
}

impl ErrorKind {
    /// Returns true when the caller supplied bad input or chose a bad state,
    /// as opposed to an infrastructure failure
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, ErrorKind::Infrastructure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::StateConflict => "STATE_CONFLICT",
            ErrorKind::Infrastructure => "INFRASTRUCTURE",
        };
        f.write_str(label)
    }
}
