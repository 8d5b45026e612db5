//! CSV panel loading.
//!
//! Reads the company-year table with polars, casts numeric columns non-strictly (so
//! malformed cells become nulls instead of failing the read) and converts each row into a
//! [`PanelRecord`]. Identity, year and sector are mandatory; what happens to a row missing
//! one of them is decided by [`RowPolicy`].

use crate::error::{DataError, Result};
use crate::panel::{CompanyId, PanelRecord, SizeTier};
use crate::sector::Sector;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Column names of the input table, one per semantic field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelColumns {
    /// Company identifier column
    pub company_id: String,
    /// Year column
    pub year: String,
    /// Sector column
    pub sector: String,
    /// Size tier column
    pub size_tier: String,
    /// Sales column
    pub sales: String,
    /// Revenue column
    pub revenue: String,
    /// Employee count column
    pub employees: String,
    /// Paid-in capital column
    pub capital: String,
    /// Branch count column
    pub branches: String,
    /// Optional founding year column
    pub start_year: Option<String>,
}

impl Default for PanelColumns {
    fn default() -> Self {
        Self {
            company_id: "company_id".to_string(),
            year: "year".to_string(),
            sector: "sector".to_string(),
            size_tier: "size_tier".to_string(),
            sales: "sales".to_string(),
            revenue: "revenue".to_string(),
            employees: "employees".to_string(),
            capital: "capital".to_string(),
            branches: "branches".to_string(),
            start_year: Some("start_year".to_string()),
        }
    }
}

impl PanelColumns {
    /// Column names of the Arabic registry export.
    pub fn arabic() -> Self {
        Self {
            company_id: "الرقم_الضريبي".to_string(),
            year: "السنة".to_string(),
            sector: "القطاع".to_string(),
            size_tier: "فئة_SME".to_string(),
            sales: "المبيعات_جنيه".to_string(),
            revenue: "الإيرادات_جنيه".to_string(),
            employees: "الموظفون".to_string(),
            capital: "رأس_المال_المدفوع_جنيه".to_string(),
            branches: "branches".to_string(),
            start_year: Some("start_year".to_string()),
        }
    }
}

/// What to do with a row whose identity, year or sector is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Fail the whole run on the first malformed row
    #[default]
    RejectRun,
    /// Drop the malformed row and keep going
    SkipRecord,
}

/// Read a CSV file into a DataFrame with full-file schema inference.
fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))
}

fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let casted = column(df, name)?.cast(&DataType::String)?;
    Ok(casted.str()?.clone())
}

fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let casted = column(df, name)?.cast(&DataType::Float64)?;
    Ok(casted.f64()?.clone())
}

fn int_column(df: &DataFrame, name: &str) -> Result<Int64Chunked> {
    let casted = column(df, name)?.cast(&DataType::Int64)?;
    Ok(casted.i64()?.clone())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Load a panel CSV into typed records.
///
/// # Errors
///
/// Returns [`DataError::MissingColumn`] when a required column is absent, and
/// [`DataError::Schema`] for the first malformed row under [`RowPolicy::RejectRun`].
pub fn load_panel(
    path: &Path,
    columns: &PanelColumns,
    policy: RowPolicy,
) -> Result<Vec<PanelRecord>> {
    let df = read_csv(path)?;
    debug!(path = %path.display(), rows = df.height(), "read panel table");
    panel_from_frame(&df, columns, policy)
}

/// Convert an in-memory DataFrame into typed records.
///
/// # Errors
///
/// Same as [`load_panel`].
pub fn panel_from_frame(
    df: &DataFrame,
    columns: &PanelColumns,
    policy: RowPolicy,
) -> Result<Vec<PanelRecord>> {
    let ids = string_column(df, &columns.company_id)?;
    let years = int_column(df, &columns.year)?;
    let sectors = string_column(df, &columns.sector)?;
    let tiers = string_column(df, &columns.size_tier)?;

    let sales = float_column(df, &columns.sales)?;
    let revenue = float_column(df, &columns.revenue)?;
    let employees = float_column(df, &columns.employees)?;
    let capital = float_column(df, &columns.capital)?;
    let branches = float_column(df, &columns.branches)?;

    let start_years = match &columns.start_year {
        Some(name) if df.column(name).is_ok() => Some(int_column(df, name)?),
        _ => None,
    };

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for row in 0..df.height() {
        let company_id = non_empty(ids.get(row));
        let year = years.get(row).and_then(|y| i32::try_from(y).ok());
        let sector = non_empty(sectors.get(row));

        let missing = if company_id.is_none() {
            Some(&columns.company_id)
        } else if year.is_none() {
            Some(&columns.year)
        } else if sector.is_none() {
            Some(&columns.sector)
        } else {
            None
        };

        let (Some(company_id), Some(year), Some(sector)) = (company_id, year, sector) else {
            let field = missing.cloned().unwrap_or_default();
            match policy {
                RowPolicy::RejectRun => return Err(DataError::Schema { row, field }),
                RowPolicy::SkipRecord => {
                    warn!(row, field = %field, "skipping malformed panel row");
                    skipped += 1;
                    continue;
                }
            }
        };

        records.push(PanelRecord {
            company_id: CompanyId::from(company_id),
            year,
            sector: Sector::parse(sector),
            size_tier: tiers.get(row).map_or(SizeTier::Unknown, SizeTier::parse),
            sales: finite(sales.get(row)),
            revenue: finite(revenue.get(row)),
            employees: finite(employees.get(row)),
            capital: finite(capital.get(row)),
            branches: finite(branches.get(row)),
            start_year: start_years
                .as_ref()
                .and_then(|s| s.get(row))
                .and_then(|y| i32::try_from(y).ok()),
        });
    }

    debug!(records = records.len(), skipped, "converted panel rows");
    Ok(records)
}

/// Load founding years from a companies table.
///
/// Rows without an identifier or a parseable year are ignored.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a named column is absent.
pub fn load_start_years(
    path: &Path,
    id_column: &str,
    start_column: &str,
) -> Result<HashMap<CompanyId, i32>> {
    let df = read_csv(path)?;
    let ids = string_column(&df, id_column)?;
    let starts = int_column(&df, start_column)?;

    let years: HashMap<CompanyId, i32> = (&ids)
        .into_iter()
        .zip(&starts)
        .filter_map(|(id, start)| {
            let id = non_empty(id)?;
            let start = i32::try_from(start?).ok()?;
            Some((CompanyId::from(id), start))
        })
        .collect();

    debug!(path = %path.display(), companies = years.len(), "read start years");
    Ok(years)
}

/// Fill `start_year` from a lookup wherever the panel does not already carry one.
///
/// Returns the number of records updated.
pub fn attach_start_years(
    records: &mut [PanelRecord],
    start_years: &HashMap<CompanyId, i32>,
) -> usize {
    let mut updated = 0;
    for record in records.iter_mut().filter(|r| r.start_year.is_none()) {
        if let Some(&start) = start_years.get(&record.company_id) {
            record.start_year = Some(start);
            updated += 1;
        }
    }
    updated
}
