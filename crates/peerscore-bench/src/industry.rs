//! Cross-sector comparison within each year.

use crate::error::BenchError;
use crate::segment::SegmentStats;
use crate::stats::{RankOrder, average_rank, percentile};
use peerscore_data::{Sector, f64_values};
use peerscore_factors::round_decimals;
use polars::prelude::*;

/// One sector's standing among all sectors of a year
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryRow {
    /// Sector
    pub sector: Sector,
    /// Year
    pub year: i32,
    /// Mean company score of the sector in that year
    pub industry_score: f64,
    /// Number of scored companies behind the mean
    pub company_count: usize,
    /// Rank among the year's sectors, 1 is best, ties averaged
    pub industry_rank_within_year: f64,
    /// Percentile among the year's sectors
    pub industry_percentile_within_year: f64,
    /// Mean of all sector means that year
    pub year_industry_mean: f64,
    /// Median of all sector means that year
    pub year_industry_median: f64,
}

/// Rank sectors against each other per year.
///
/// Rows are ordered by year, then rank, then sector.
///
/// # Errors
///
/// Returns [`BenchError`] when the ranking expressions fail to evaluate.
pub fn industry_table(segments: &[SegmentStats]) -> Result<Vec<IndustryRow>, BenchError> {
    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let year = [col("year")];
    let frame = DataFrame::new(vec![
        Column::new(
            "year".into(),
            segments.iter().map(|s| s.key.year).collect::<Vec<_>>(),
        ),
        Column::new(
            "industry_score".into(),
            segments.iter().map(|s| s.mean).collect::<Vec<_>>(),
        ),
    ])?
    .lazy()
    .with_columns([
        average_rank("industry_score", RankOrder::Descending, &year).alias("rank"),
        percentile("industry_score", &year).alias("percentile"),
        col("industry_score").mean().over(&year).alias("year_mean"),
        col("industry_score").median().over(&year).alias("year_median"),
    ])
    .collect()?;

    let ranks = f64_values(&frame, "rank")?;
    let percentiles = f64_values(&frame, "percentile")?;
    let year_means = f64_values(&frame, "year_mean")?;
    let year_medians = f64_values(&frame, "year_median")?;

    let value = |values: &[Option<f64>], i: usize, column: &'static str| {
        values
            .get(i)
            .copied()
            .flatten()
            .ok_or(BenchError::MissingValue { column })
    };

    let mut rows = Vec::with_capacity(segments.len());
    for (i, stats) in segments.iter().enumerate() {
        rows.push(IndustryRow {
            sector: stats.key.sector.clone(),
            year: stats.key.year,
            industry_score: stats.mean,
            company_count: stats.count,
            industry_rank_within_year: value(&ranks, i, "rank")?,
            industry_percentile_within_year: round_decimals(
                value(&percentiles, i, "percentile")?,
                2,
            ),
            year_industry_mean: value(&year_means, i, "year_mean")?,
            year_industry_median: value(&year_medians, i, "year_median")?,
        });
    }
    rows.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then_with(|| {
                a.industry_rank_within_year
                    .total_cmp(&b.industry_rank_within_year)
            })
            .then_with(|| a.sector.cmp(&b.sector))
    });
    Ok(rows)
}
