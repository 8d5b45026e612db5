//! Benchmark Engine
//!
//! Compares every scored company-year against its `(sector, year)` peers, attaches
//! historical deltas, and aggregates segment means into the industry table and trend
//! matrix. Only records with a defined score take part in any statistic; unscored records
//! pass through with no benchmark.

use crate::error::BenchError;
use crate::history::{HistoricalDelta, historical_deltas};
use crate::industry::{IndustryRow, industry_table};
use crate::segment::{BenchmarkRecord, IndustryYear, SegmentStats, benchmark_segments};
use crate::stats::Dispersion;
use crate::trend::TrendMatrix;
use peerscore_factors::{DerivedRecord, ScoredRecord};
use std::cmp::Ordering;
use tracing::debug;

/// A scored company-year with its benchmark and history
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkedRow {
    /// Scored record
    pub scored: ScoredRecord,
    /// Peer comparison; `None` when the record has no score
    pub benchmark: Option<BenchmarkRecord>,
    /// Movement against the company's previous observed year
    pub history: HistoricalDelta,
}

impl BenchmarkedRow {
    /// Segment key of the row
    pub fn key(&self) -> IndustryYear {
        let panel = &self.scored.record.derived.panel;
        IndustryYear::new(panel.year, panel.sector.clone())
    }
}

/// Everything a benchmark run produces
#[derive(Debug, Clone, Default)]
pub struct BenchmarkOutput {
    /// One row per input record, ordered by year, sector, rank, then company
    pub rows: Vec<BenchmarkedRow>,
    /// Statistics of every segment with at least one score, in key order
    pub segments: Vec<SegmentStats>,
    /// Sector standings per year
    pub industries: Vec<IndustryRow>,
    /// Sector by year mean scores
    pub trend: TrendMatrix,
}

/// Peer benchmarking over a whole scored panel
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkEngine {
    dispersion: Dispersion,
}

impl BenchmarkEngine {
    /// Create an engine using the given standard deviation estimator
    pub const fn new(dispersion: Dispersion) -> Self {
        Self { dispersion }
    }

    /// Standard deviation estimator in use
    pub const fn dispersion(&self) -> Dispersion {
        self.dispersion
    }

    /// Benchmark all records.
    ///
    /// `excluded` holds records dropped during normalization. They get no row, but their
    /// years still count as observed when computing historical deltas.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError`] when the segment or industry statistics fail to evaluate.
    pub fn run(
        &self,
        records: Vec<ScoredRecord>,
        excluded: &[DerivedRecord],
    ) -> Result<BenchmarkOutput, BenchError> {
        let history = historical_deltas(&records, excluded);

        let (positions, members): (Vec<usize>, Vec<(IndustryYear, f64)>) = records
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| {
                let panel = &record.record.derived.panel;
                let key = IndustryYear::new(panel.year, panel.sector.clone());
                record.score.map(|score| (idx, (key, score)))
            })
            .unzip();
        let (segments, computed) = benchmark_segments(&members, self.dispersion)?;

        let mut benchmarks: Vec<Option<BenchmarkRecord>> = vec![None; records.len()];
        for (idx, benchmark) in positions.into_iter().zip(computed) {
            benchmarks[idx] = Some(benchmark);
        }

        let mut rows: Vec<BenchmarkedRow> = records
            .into_iter()
            .zip(benchmarks)
            .zip(history)
            .map(|((scored, benchmark), history)| BenchmarkedRow {
                scored,
                benchmark,
                history,
            })
            .collect();
        rows.sort_by(compare_rows);

        let industries = industry_table(&segments)?;
        let trend = TrendMatrix::from_segments(&segments);

        debug!(
            rows = rows.len(),
            segments = segments.len(),
            industries = industries.len(),
            "benchmarked scores"
        );

        Ok(BenchmarkOutput {
            rows,
            segments,
            industries,
            trend,
        })
    }
}

/// Year, sector, rank (unranked last), company.
fn compare_rows(a: &BenchmarkedRow, b: &BenchmarkedRow) -> Ordering {
    let rank = |row: &BenchmarkedRow| row.benchmark.map(|bm| bm.rank_within_segment);
    a.key()
        .cmp(&b.key())
        .then_with(|| match (rank(a), rank(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| {
            a.scored
                .record
                .derived
                .panel
                .company_id
                .cmp(&b.scored.record.derived.panel.company_id)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerscore_data::{IsicSection, PanelRecord, Sector, SizeTier};
    use peerscore_factors::{
        FallbackPolicy, FeatureDeriver, ScoreCalculator, ScoringVariant, SectorWeightTable,
        SegmentNormalizer,
    };

    fn score(panel: Vec<PanelRecord>, fallback: FallbackPolicy) -> Vec<ScoredRecord> {
        let derived = FeatureDeriver::default().derive(panel).unwrap();
        let normalized = SegmentNormalizer::default().normalize(derived).unwrap().records;
        ScoreCalculator::new(SectorWeightTable::builtin(ScoringVariant::Peers), fallback)
            .score(normalized)
    }

    fn company(id: &str, year: i32, sector: Sector, sales: f64) -> PanelRecord {
        PanelRecord::new(id, year, sector, SizeTier::Small)
            .with_sales(sales)
            .with_employees(sales / 10.0)
    }

    #[test]
    fn test_unscored_records_are_not_ranked() {
        let trade = Sector::Isic(IsicSection::Trade);
        let unknown = Sector::Unclassified("Unknown".into());
        let panel = vec![
            company("A", 2021, trade.clone(), 100.0),
            company("B", 2021, trade.clone(), 300.0),
            company("C", 2021, unknown.clone(), 200.0),
            company("D", 2021, unknown, 400.0),
        ];
        let output = BenchmarkEngine::default()
            .run(score(panel, FallbackPolicy::Deny), &[])
            .unwrap();

        assert_eq!(output.rows.len(), 4);
        assert_eq!(output.segments.len(), 1);
        let unranked: Vec<_> = output.rows.iter().filter(|r| r.benchmark.is_none()).collect();
        assert_eq!(unranked.len(), 2);
        assert!(unranked.iter().all(|r| r.history.score_delta.is_none()));
        assert_eq!(output.trend.sectors(), &[trade]);
    }

    #[test]
    fn test_rows_sorted_by_rank_within_segment() {
        let trade = Sector::Isic(IsicSection::Trade);
        let panel = vec![
            company("A", 2021, trade.clone(), 100.0),
            company("B", 2021, trade.clone(), 300.0),
            company("C", 2021, trade, 200.0),
        ];
        let output = BenchmarkEngine::default()
            .run(score(panel, FallbackPolicy::Allow), &[])
            .unwrap();

        let ids: Vec<&str> = output
            .rows
            .iter()
            .map(|r| r.scored.record.derived.panel.company_id.as_str())
            .collect();
        assert_eq!(ids, vec!["B", "C", "A"]);
        let ranks: Vec<f64> = output
            .rows
            .iter()
            .filter_map(|r| r.benchmark.map(|b| b.rank_within_segment))
            .collect();
        assert_eq!(ranks, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_history_attached_to_rows() {
        let trade = Sector::Isic(IsicSection::Trade);
        let panel = vec![
            company("A", 2020, trade.clone(), 100.0),
            company("B", 2020, trade.clone(), 300.0),
            company("A", 2021, trade.clone(), 500.0),
            company("B", 2021, trade, 200.0),
        ];
        let output = BenchmarkEngine::default()
            .run(score(panel, FallbackPolicy::Allow), &[])
            .unwrap();

        for row in &output.rows {
            let year = row.scored.record.derived.panel.year;
            if year == 2020 {
                assert_eq!(row.history.score_delta, Some(0.0));
            } else {
                assert_eq!(row.history.previous_year, Some(2020));
            }
        }
        let a_2021 = output
            .rows
            .iter()
            .find(|r| {
                let p = &r.scored.record.derived.panel;
                p.company_id.as_str() == "A" && p.year == 2021
            })
            .unwrap();
        assert_eq!(a_2021.history.sales_change_pct, 400.0);
        assert!(a_2021.history.score_delta.unwrap() > 0.0);
    }
}
