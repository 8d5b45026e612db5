//! Reading computed columns back into typed records.
//!
//! Stages build a DataFrame from their records, run lazy expressions over it, and map the
//! collected columns back by position. Nulls surface as `None` so callers apply their own
//! fallbacks.

use polars::prelude::*;

/// Values of a numeric column as `f64`.
pub fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Values of an integer column as `i32`.
pub fn i32_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i32>>> {
    let column = df.column(name)?.cast(&DataType::Int32)?;
    Ok(column.i32()?.into_iter().collect())
}

/// Source positions recorded by `with_row_index`, in frame order.
pub fn row_order(df: &DataFrame, name: &str) -> PolarsResult<Vec<usize>> {
    let column = df.column(name)?.cast(&DataType::UInt64)?;
    let positions: Vec<usize> = column
        .u64()?
        .into_iter()
        .flatten()
        .map(|i| i as usize)
        .collect();
    if positions.len() != df.height() {
        return Err(PolarsError::ComputeError(
            format!("row index column '{name}' contains nulls").into(),
        ));
    }
    Ok(positions)
}
