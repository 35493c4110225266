//! Error types for the polyflow workflow steps.
//!
//! All crates return `FlowResult<T>` from fallible operations.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the polyflow steps.
#[derive(Debug, Error)]
pub enum FlowError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O operation on a contract file failed.
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A token in numeric text is not a float.
    #[error("Line {line}: cannot parse '{token}' as a number")]
    Parse { line: usize, token: String },

    /// A matrix row has a different length than the first row.
    #[error("Line {line}: expected {expected} values, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A scalar file holds no value.
    #[error("Expected a single number, found empty input")]
    EmptyScalar,

    /// Matrix dimensions are not conformant for an operation.
    #[error("Shape mismatch in {op}: {}x{} vs {}x{}", left.0, left.1, right.0, right.1)]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// A flat buffer does not hold rows × cols values.
    #[error("Buffer of {len} values cannot fill a {rows}x{cols} matrix")]
    BufferLength { rows: usize, cols: usize, len: usize },

    /// A matrix product was requested over no factors.
    #[error("Cannot multiply an empty chain of matrices")]
    EmptyChain,

    /// Requested dimensions exceed what can be allocated.
    #[error("Matrix of {rows}x{cols} is too large to allocate")]
    TooLarge { rows: usize, cols: usize },

    /// The singular value decomposition failed.
    #[error("Decomposition failed: {0}")]
    Decomposition(String),

    /// Two matrices differ by at least the comparator tolerance.
    #[error("Matrices differ: Frobenius norm {norm:.3e} is not below {tolerance:.3e}")]
    ToleranceExceeded { norm: f64, tolerance: f64 },

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FlowError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for `Result<T, FlowError>`.
pub type FlowResult<T> = Result<T, FlowError>;
