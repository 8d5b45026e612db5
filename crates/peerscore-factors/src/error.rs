//! Errors raised while deriving and scoring features.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Fatal input and evaluation errors. Numeric degeneracies never surface here; they
/// resolve to the documented fallback values instead.
#[derive(Debug, Error)]
pub enum FactorError {
    /// A record has an empty company identifier
    #[error("Record for year {year} has an empty company identifier")]
    EmptyCompanyId {
        /// Year of the offending record
        year: i32,
    },

    /// The same (company, year) pair appears more than once
    #[error("Duplicate record for company {company_id} in year {year}")]
    DuplicateRecord {
        /// Company identifier
        company_id: String,
        /// Duplicated year
        year: i32,
    },

    /// A column expression failed to evaluate
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}
