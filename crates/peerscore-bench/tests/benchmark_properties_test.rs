//! Invariants of a full benchmark run over a multi-sector, multi-year panel.

use approx::assert_relative_eq;
use peerscore_bench::{BenchmarkEngine, BenchmarkOutput, Dispersion};
use peerscore_data::{IsicSection, PanelRecord, Sector, SizeTier};
use peerscore_factors::{
    FallbackPolicy, FeatureDeriver, ScoreCalculator, ScoringVariant, SectorWeightTable,
    SegmentNormalizer,
};
use rstest::rstest;
use std::collections::BTreeMap;

fn panel() -> Vec<PanelRecord> {
    let sectors = [
        IsicSection::Manufacturing,
        IsicSection::Trade,
        IsicSection::Information,
    ];
    let mut records = Vec::new();
    for c in 0..24_i32 {
        let sector = Sector::Isic(sectors[(c % 3) as usize]);
        let tier = if c % 4 == 0 {
            SizeTier::Medium
        } else {
            SizeTier::Small
        };
        for year in 2019..2023 {
            // Company 5 skips 2021
            if c == 5 && year == 2021 {
                continue;
            }
            let t = year - 2019;
            records.push(
                PanelRecord::new(format!("TAX{c:03}"), year, sector.clone(), tier)
                    .with_sales(f64::from((c * 131 + t * 57) % 97) * 1_000.0)
                    .with_revenue(f64::from((c * 17 + t * 5) % 41) * 100.0)
                    .with_employees(f64::from((c + t) % 13 + 1))
                    .with_capital(f64::from(c % 5) * 500.0)
                    .with_branches(f64::from(c % 3 + 1))
                    .with_start_year(1995 + c % 20),
            );
        }
    }
    records
}

fn run(dispersion: Dispersion) -> BenchmarkOutput {
    let derived = FeatureDeriver::default().derive(panel()).unwrap();
    let normalized = SegmentNormalizer::default().normalize(derived).unwrap().records;
    let scored = ScoreCalculator::new(
        SectorWeightTable::builtin(ScoringVariant::Peers),
        FallbackPolicy::Allow,
    )
    .score(normalized);
    BenchmarkEngine::new(dispersion).run(scored, &[]).unwrap()
}

#[rstest]
#[case(Dispersion::Sample)]
#[case(Dispersion::Population)]
fn test_rank_sums_per_segment(#[case] dispersion: Dispersion) {
    let output = run(dispersion);
    let mut sums: BTreeMap<_, (f64, usize)> = BTreeMap::new();
    for row in &output.rows {
        let bm = row.benchmark.unwrap();
        let entry = sums.entry(row.key()).or_insert((0.0, 0));
        entry.0 += bm.rank_within_segment;
        entry.1 += 1;
        let segment = output.segments.iter().find(|s| s.key == row.key()).unwrap();
        assert_eq!(bm.count_in_segment, segment.count);
    }
    for (total, n) in sums.values() {
        let n = *n as f64;
        assert_relative_eq!(*total, n * (n + 1.0) / 2.0);
    }
}

#[test]
fn test_percentile_non_decreasing_in_score() {
    let output = run(Dispersion::Sample);
    for a in &output.rows {
        for b in &output.rows {
            if a.key() != b.key() {
                continue;
            }
            let (sa, sb) = (a.scored.score.unwrap(), b.scored.score.unwrap());
            let (pa, pb) = (
                a.benchmark.unwrap().percentile_within_segment,
                b.benchmark.unwrap().percentile_within_segment,
            );
            if sa < sb {
                assert!(pa <= pb);
            }
            if sa == sb {
                assert_eq!(pa, pb);
            }
        }
    }
}

#[test]
fn test_scores_and_percentiles_bounded() {
    let output = run(Dispersion::Sample);
    assert_eq!(output.rows.len(), 24 * 4 - 1);
    for row in &output.rows {
        let score = row.scored.score.unwrap();
        assert!((0.0..=10.0).contains(&score));
        let pct = row.benchmark.unwrap().percentile_within_segment;
        assert!(pct > 0.0 && pct <= 100.0);
    }
}

#[test]
fn test_first_observed_year_has_zero_delta() {
    let output = run(Dispersion::Sample);
    for row in &output.rows {
        let panel = &row.scored.record.derived.panel;
        if panel.year == 2019 {
            assert_eq!(row.history.score_delta, Some(0.0));
            assert_eq!(row.history.sales_change_pct, 0.0);
        }
        if panel.company_id.as_str() == "TAX005" && panel.year == 2022 {
            assert_eq!(row.history.previous_year, Some(2020));
        }
    }
}

#[test]
fn test_trend_matrix_matches_segment_means() {
    let output = run(Dispersion::Sample);
    assert_eq!(output.trend.years(), &[2019, 2020, 2021, 2022]);
    assert_eq!(output.trend.sectors().len(), 3);
    for stats in &output.segments {
        assert_eq!(
            output.trend.get(&stats.key.sector, stats.key.year),
            Some(stats.mean)
        );
    }
    // Three sectors in each of four years
    assert_eq!(output.industries.len(), 12);
}

#[test]
fn test_run_is_idempotent() {
    let first = run(Dispersion::Sample);
    let second = run(Dispersion::Sample);
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.segments, second.segments);
    assert_eq!(first.industries, second.industries);
    assert_eq!(first.trend, second.trend);
}
