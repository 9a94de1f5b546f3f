//! Error types for MBP reconstruction.
//!
//! Clean error handling using `thiserror` for ergonomic error definitions.
//!
//! Only unrecoverable faults surface as errors: duplicate live order ids,
//! orders changing side, and I/O or decode-setup failures. Recoverable
//! anomalies (unknown-id cancels, oversized cancels, synthetic trades at
//! missing levels) are logged and counted instead.

use thiserror::Error;

/// Result type alias for MBP reconstruction operations.
pub type Result<T> = std::result::Result<T, MbpError>;

/// Main error type for MBP reconstruction.
#[derive(Error, Debug, Clone)]
pub enum MbpError {
    /// Add received for an order id that is already live in the book
    #[error("Duplicate order id {0} for Add")]
    DuplicateOrderId(u64),

    /// Modify reported a different side than the resting order
    #[error("Order id {0} changed side")]
    OrderSideChanged(u64),

    /// A CSV field failed to parse
    #[error("Invalid field {name} at record {record}: {value:?}")]
    InvalidField {
        /// Column name from the input contract
        name: &'static str,
        /// Offending raw value
        value: String,
        /// One-based data record number (header excluded)
        record: u64,
    },

    /// A CSV record had the wrong shape
    #[error("Malformed record {record}: expected {expected} fields, got {actual}")]
    MalformedRecord {
        /// One-based data record number (header excluded)
        record: u64,
        /// Required field count
        expected: usize,
        /// Observed field count
        actual: usize,
    },

    /// I/O failure, stringified to keep the error cheap to clone
    #[error("IO error: {0}")]
    Io(String),

    /// CSV-layer failure, stringified to keep the error cheap to clone
    #[error("CSV error: {0}")]
    Csv(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Generic(String),
}

impl MbpError {
    /// Create a generic error from any string-like type.
    pub fn generic(msg: impl Into<String>) -> Self {
        MbpError::Generic(msg.into())
    }
}

impl From<std::io::Error> for MbpError {
    fn from(err: std::io::Error) -> Self {
        MbpError::Io(err.to_string())
    }
}

impl From<csv::Error> for MbpError {
    fn from(err: csv::Error) -> Self {
        MbpError::Csv(err.to_string())
    }
}

impl From<String> for MbpError {
    fn from(err: String) -> Self {
        MbpError::Generic(err)
    }
}

impl From<&str> for MbpError {
    fn from(err: &str) -> Self {
        MbpError::Generic(err.to_string())
    }
}
