//! Errors raised while benchmarking scores.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Benchmark errors. Degenerate segments never surface here; a lone or flat segment
/// resolves to an undefined std and z-score instead.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A statistic expression failed to evaluate
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// A statistic that is always defined for a non-empty segment came back null
    #[error("Missing value in column {column}")]
    MissingValue {
        /// Column name
        column: &'static str,
    },
}
