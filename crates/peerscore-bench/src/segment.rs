//! Per-segment benchmark statistics.

use crate::error::BenchError;
use crate::stats::{self, Dispersion, RankOrder, average_rank, percentile};
use peerscore_data::{Sector, f64_values, row_order};
use peerscore_factors::round_decimals;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Benchmark segment key: one sector in one year
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndustryYear {
    /// Year
    pub year: i32,
    /// Sector
    pub sector: Sector,
}

impl IndustryYear {
    /// Create a key
    pub const fn new(year: i32, sector: Sector) -> Self {
        Self { year, sector }
    }
}

/// Summary statistics of one segment's scores
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentStats {
    /// Segment key
    pub key: IndustryYear,
    /// Number of scored records
    pub count: usize,
    /// Mean score
    pub mean: f64,
    /// Median score
    pub median: f64,
    /// Standard deviation; `None` for a single-record segment
    pub std: Option<f64>,
}

/// Benchmark fields of one scored company-year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    /// Segment mean score
    pub industry_mean: f64,
    /// Segment median score
    pub industry_median: f64,
    /// Segment standard deviation
    pub industry_std: Option<f64>,
    /// Score minus segment mean
    pub gap_to_mean: f64,
    /// Gap divided by std; `None` when std is undefined or 0
    pub z_score: Option<f64>,
    /// 1 is best; ties share the average of their ranks
    pub rank_within_segment: f64,
    /// Ascending average rank over count, times 100
    pub percentile_within_segment: f64,
    /// Number of scored records in the segment
    pub count_in_segment: usize,
}

/// Benchmark every score against its `(sector, year)` peers.
///
/// `members` pairs each score with its segment key. Records are aligned with `members`;
/// segment statistics come back in key order.
///
/// # Errors
///
/// Returns [`BenchError`] when the segment expressions fail to evaluate.
pub fn benchmark_segments(
    members: &[(IndustryYear, f64)],
    dispersion: Dispersion,
) -> Result<(Vec<SegmentStats>, Vec<BenchmarkRecord>), BenchError> {
    if members.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let segment = [col("year"), col("sector")];
    let frame = DataFrame::new(vec![
        Column::new(
            "year".into(),
            members.iter().map(|(key, _)| key.year).collect::<Vec<_>>(),
        ),
        Column::new(
            "sector".into(),
            members
                .iter()
                .map(|(key, _)| key.sector.partition_key())
                .collect::<Vec<_>>(),
        ),
        Column::new(
            "score".into(),
            members.iter().map(|(_, score)| *score).collect::<Vec<_>>(),
        ),
    ])?
    .lazy()
    .with_row_index("member", None);

    let rows = frame
        .clone()
        .with_columns([
            col("score").mean().over(&segment).alias("industry_mean"),
            col("score").median().over(&segment).alias("industry_median"),
            stats::dispersion("score", dispersion, &segment).alias("industry_std"),
            col("score").count().over(&segment).alias("count"),
            average_rank("score", RankOrder::Descending, &segment).alias("rank"),
            percentile("score", &segment).alias("percentile"),
        ])
        .collect()?;
    let columns = SegmentColumns::read(&rows)?;
    let ranks = f64_values(&rows, "rank")?;
    let percentiles = f64_values(&rows, "percentile")?;

    let mut records = Vec::with_capacity(members.len());
    for (i, (_, score)) in members.iter().enumerate() {
        let peers = columns.summary(i)?;
        let gap = score - peers.mean;
        records.push(BenchmarkRecord {
            industry_mean: peers.mean,
            industry_median: peers.median,
            industry_std: peers.std,
            gap_to_mean: gap,
            z_score: peers.std.filter(|s| *s > 0.0).map(|s| gap / s),
            rank_within_segment: required(&ranks, i, "rank")?,
            percentile_within_segment: round_decimals(
                required(&percentiles, i, "percentile")?,
                2,
            ),
            count_in_segment: peers.count,
        });
    }

    let grouped = frame
        .group_by(segment)
        .agg([
            col("member").first(),
            col("score").mean().alias("industry_mean"),
            col("score").median().alias("industry_median"),
            col("score").std(dispersion.ddof()).alias("industry_std"),
            col("score").count().alias("count"),
        ])
        .collect()?;
    let firsts = row_order(&grouped, "member")?;
    let columns = SegmentColumns::read(&grouped)?;

    let mut segments = Vec::with_capacity(firsts.len());
    for (g, &first) in firsts.iter().enumerate() {
        let peers = columns.summary(g)?;
        let key = members
            .get(first)
            .map(|(key, _)| key.clone())
            .ok_or(BenchError::MissingValue { column: "member" })?;
        segments.push(SegmentStats {
            key,
            count: peers.count,
            mean: peers.mean,
            median: peers.median,
            std: peers.std,
        });
    }
    segments.sort_by(|a, b| a.key.cmp(&b.key));

    Ok((segments, records))
}

/// Statistic columns shared by the per-row and per-segment frames.
struct SegmentColumns {
    mean: Vec<Option<f64>>,
    median: Vec<Option<f64>>,
    std: Vec<Option<f64>>,
    count: Vec<Option<f64>>,
}

struct PeerSummary {
    count: usize,
    mean: f64,
    median: f64,
    std: Option<f64>,
}

impl SegmentColumns {
    fn read(df: &DataFrame) -> Result<Self, BenchError> {
        Ok(Self {
            mean: f64_values(df, "industry_mean")?,
            median: f64_values(df, "industry_median")?,
            std: f64_values(df, "industry_std")?,
            count: f64_values(df, "count")?,
        })
    }

    fn summary(&self, i: usize) -> Result<PeerSummary, BenchError> {
        let count = required(&self.count, i, "count")? as usize;
        Ok(PeerSummary {
            count,
            mean: required(&self.mean, i, "industry_mean")?,
            median: required(&self.median, i, "industry_median")?,
            // A lone score has no spread to compare against
            std: self
                .std
                .get(i)
                .copied()
                .flatten()
                .filter(|s| count >= 2 && s.is_finite()),
        })
    }
}

fn required(values: &[Option<f64>], i: usize, column: &'static str) -> Result<f64, BenchError> {
    values
        .get(i)
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
        .ok_or(BenchError::MissingValue { column })
}
