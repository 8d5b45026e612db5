//! Export of benchmarked scores, trend matrices and industry tables.
//!
//! Benchmark statistics (means, medians, standard deviations, gaps and z-scores) are
//! rounded to 4 decimals on export. Scores, ranks, percentiles and deltas are already
//! rounded by the pipeline and are written as computed.

use peerscore_bench::{BenchmarkedRow, IndustryRow, TrendMatrix};
use peerscore_factors::round_decimals;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Decimal places for exported benchmark statistics.
const EXPORT_DECIMALS: i32 = 4;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

fn round4(value: f64) -> f64 {
    let rounded = round_decimals(value, EXPORT_DECIMALS);
    // Avoid writing "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn serialize_rows<T: Serialize>(rows: &[T], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            for row in rows {
                wtr.serialize(row)?;
            }
            finish_csv(wtr)
        }
        ExportFormat::Json => Ok(serde_json::to_string(rows)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(rows)?),
    }
}

/// One benchmarked company-year, flattened for export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkExport {
    /// Company identifier.
    pub company_id: String,
    /// Year.
    pub year: i32,
    /// ISIC section letter, empty when unclassified.
    pub sector_code: String,
    /// Sector name.
    pub sector: String,
    /// Size tier.
    pub size_tier: String,
    /// Sales as reported.
    pub sales: Option<f64>,
    /// Revenue as reported.
    pub revenue: Option<f64>,
    /// Employee count as reported.
    pub employees: Option<f64>,
    /// Paid-in capital as reported.
    pub capital: Option<f64>,
    /// Branch count as reported.
    pub branches: Option<f64>,
    /// Founding year, when known.
    pub start_year: Option<i32>,
    /// Year-over-year sales growth.
    pub sales_growth: f64,
    /// Year-over-year employee growth.
    pub employee_growth: f64,
    /// Age in years.
    pub age: i32,
    /// Revenue over capital.
    pub return_on_capital: f64,
    /// Score in [0, 10].
    pub score: Option<f64>,
    /// `registered` or `fallback`.
    pub weight_source: String,
    /// Segment mean score.
    pub industry_mean: Option<f64>,
    /// Segment median score.
    pub industry_median: Option<f64>,
    /// Segment standard deviation.
    pub industry_std: Option<f64>,
    /// Score minus segment mean.
    pub gap_to_mean: Option<f64>,
    /// Standardized gap.
    pub z_score: Option<f64>,
    /// Rank within the segment, 1 is best.
    pub rank_within_segment: Option<f64>,
    /// Percentile within the segment.
    pub percentile_within_segment: Option<f64>,
    /// Scored records in the segment.
    pub count_in_segment: Option<usize>,
    /// Score change against the previous observed year.
    pub score_delta: Option<f64>,
    /// Sales change in percent against the previous year.
    pub sales_change_pct: f64,
}

impl From<&BenchmarkedRow> for BenchmarkExport {
    fn from(row: &BenchmarkedRow) -> Self {
        let derived = &row.scored.record.derived;
        let panel = &derived.panel;
        let features = &derived.features;
        let bm = row.benchmark;

        Self {
            company_id: panel.company_id.to_string(),
            year: panel.year,
            sector_code: panel.sector.code(),
            sector: panel.sector.to_string(),
            size_tier: panel.size_tier.as_str().to_string(),
            sales: panel.sales,
            revenue: panel.revenue,
            employees: panel.employees,
            capital: panel.capital,
            branches: panel.branches,
            start_year: panel.start_year,
            sales_growth: round4(features.sales_growth),
            employee_growth: round4(features.employee_growth),
            age: features.age,
            return_on_capital: round4(features.return_on_capital),
            score: row.scored.score,
            weight_source: row.scored.weight_source.as_str().to_string(),
            industry_mean: bm.map(|b| round4(b.industry_mean)),
            industry_median: bm.map(|b| round4(b.industry_median)),
            industry_std: bm.and_then(|b| b.industry_std).map(round4),
            gap_to_mean: bm.map(|b| round4(b.gap_to_mean)),
            z_score: bm.and_then(|b| b.z_score).map(round4),
            rank_within_segment: bm.map(|b| b.rank_within_segment),
            percentile_within_segment: bm.map(|b| b.percentile_within_segment),
            count_in_segment: bm.map(|b| b.count_in_segment),
            score_delta: row.history.score_delta,
            sales_change_pct: row.history.sales_change_pct,
        }
    }
}

impl BenchmarkExport {
    /// Flatten a set of benchmarked rows, preserving order.
    pub fn from_rows(rows: &[BenchmarkedRow]) -> Vec<Self> {
        rows.iter().map(Self::from).collect()
    }
}

/// One sector standing within a year, flattened for export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndustryExport {
    /// ISIC section letter, empty when unclassified.
    pub sector_code: String,
    /// Sector name.
    pub sector: String,
    /// Year.
    pub year: i32,
    /// Sector mean score.
    pub industry_score: f64,
    /// Scored companies in the sector that year.
    pub company_count: usize,
    /// Rank among the year's sectors.
    pub industry_rank_within_year: f64,
    /// Percentile among the year's sectors.
    pub industry_percentile_within_year: f64,
    /// Mean of all sector means that year.
    pub year_industry_mean: f64,
    /// Median of all sector means that year.
    pub year_industry_median: f64,
}

impl From<&IndustryRow> for IndustryExport {
    fn from(row: &IndustryRow) -> Self {
        Self {
            sector_code: row.sector.code(),
            sector: row.sector.to_string(),
            year: row.year,
            industry_score: round4(row.industry_score),
            company_count: row.company_count,
            industry_rank_within_year: row.industry_rank_within_year,
            industry_percentile_within_year: row.industry_percentile_within_year,
            year_industry_mean: round4(row.year_industry_mean),
            year_industry_median: round4(row.year_industry_median),
        }
    }
}

impl IndustryExport {
    /// Flatten an industry table, preserving order.
    pub fn from_rows(rows: &[IndustryRow]) -> Vec<Self> {
        rows.iter().map(Self::from).collect()
    }
}

/// One sector's mean scores across all years.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendRowExport {
    /// ISIC section letter, empty when unclassified.
    pub sector_code: String,
    /// Sector name.
    pub sector: String,
    /// Mean score per year, aligned with the matrix years.
    pub values: Vec<Option<f64>>,
}

/// Sector by year trend matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendMatrixExport {
    /// Column years, ascending.
    pub years: Vec<i32>,
    /// One row per sector.
    pub rows: Vec<TrendRowExport>,
}

impl From<&TrendMatrix> for TrendMatrixExport {
    fn from(matrix: &TrendMatrix) -> Self {
        Self {
            years: matrix.years().to_vec(),
            rows: matrix
                .sectors()
                .iter()
                .map(|sector| TrendRowExport {
                    sector_code: sector.code(),
                    sector: sector.to_string(),
                    values: matrix
                        .row(sector)
                        .into_iter()
                        .map(|v| v.map(round4))
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for Vec<BenchmarkExport> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        serialize_rows(self, format)
    }
}

impl Exporter for Vec<IndustryExport> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        serialize_rows(self, format)
    }
}

impl Exporter for TrendMatrixExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec!["sector".to_string()];
                header.extend(self.years.iter().map(ToString::to_string));
                wtr.write_record(&header)?;

                for row in &self.rows {
                    let mut record = vec![row.sector.clone()];
                    record.extend(
                        row.values
                            .iter()
                            .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
                    );
                    wtr.write_record(&record)?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
