//! Ledger error types

use thiserror::Error;

/// Errors a ledger mutation or date-key parse can produce
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid date key '{0}': expected YYYY-MM-DD")]
    InvalidDateKey(String),

    #[error("{field} must be a finite number (got {value})")]
    NonFiniteValue { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    NegativeValue { field: &'static str, value: f64 },
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
