//! Error types for panel loading.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading or validating a panel.
#[derive(Debug, Error)]
pub enum DataError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is absent from the input table
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A mandatory field (identity, year or sector) is empty or unparseable
    #[error("Schema error at row {row}: field '{field}' is missing or invalid")]
    Schema {
        /// Zero-based data row index
        row: usize,
        /// Column name of the offending field
        field: String,
    },
}
