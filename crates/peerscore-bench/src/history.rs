//! Year-over-year movement of a company's score.
//!
//! Deltas compare each record with the company's immediately preceding observed year,
//! which need not be the calendar year before when the company skipped a year.

use peerscore_data::PanelRecord;
use peerscore_factors::{DerivedRecord, ScoredRecord, round_decimals};
use serde::{Deserialize, Serialize};

/// Historical movement of one company-year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDelta {
    /// Score minus the previous observed score, rounded to 2 decimals.
    ///
    /// 0 for a first appearance or when the previous score is undefined; `None` when this
    /// record's own score is undefined.
    pub score_delta: Option<f64>,
    /// Year-over-year sales change in percent
    pub sales_change_pct: f64,
    /// Year compared against, if any
    pub previous_year: Option<i32>,
}

/// Compute deltas for every record. Output is aligned with `records`.
///
/// `excluded` holds company-years dropped before scoring. They count as observed years
/// with an undefined score, so the year after an exclusion compares against the excluded
/// year rather than an earlier one.
pub fn historical_deltas(
    records: &[ScoredRecord],
    excluded: &[DerivedRecord],
) -> Vec<HistoricalDelta> {
    // (panel, score, position in `records`)
    let mut observed: Vec<(&PanelRecord, Option<f64>, Option<usize>)> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (&r.record.derived.panel, r.score, Some(i)))
        .chain(excluded.iter().map(|d| (&d.panel, None, None)))
        .collect();
    observed.sort_by(|a, b| (&a.0.company_id, a.0.year).cmp(&(&b.0.company_id, b.0.year)));

    let mut deltas = vec![
        HistoricalDelta {
            score_delta: None,
            sales_change_pct: 0.0,
            previous_year: None,
        };
        records.len()
    ];

    let mut previous: Option<(&PanelRecord, Option<f64>)> = None;
    for &(panel, score, position) in &observed {
        let prior = previous.filter(|(p, _)| p.company_id == panel.company_id);
        if let Some(i) = position {
            let score_delta = score.map(|current| match prior.and_then(|(_, s)| s) {
                Some(before) => round_decimals(current - before, 2),
                None => 0.0,
            });
            deltas[i] = HistoricalDelta {
                score_delta,
                sales_change_pct: records[i].record.derived.features.sales_change_pct,
                previous_year: prior.map(|(p, _)| p.year),
            };
        }
        previous = Some((panel, score));
    }

    deltas
}
