//! Run summary: record counts and score distribution of one pipeline run.

use peerscore_bench::BenchmarkOutput;
use peerscore_factors::{WeightSource, round_decimals};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Distribution of defined scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreDistribution {
    /// Lowest score.
    pub min: f64,
    /// Mean score.
    pub mean: f64,
    /// Median score.
    pub median: f64,
    /// Highest score.
    pub max: f64,
}

impl ScoreDistribution {
    /// Describe a set of scores; `None` when empty.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        let series = Series::new("score".into(), scores);
        let values = series.f64().ok()?;
        Some(Self {
            min: values.min()?,
            mean: round_decimals(series.mean()?, 4),
            median: series.median()?,
            max: values.max()?,
        })
    }
}

/// Counts and score distribution of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// Records read from the panel.
    pub records_loaded: usize,
    /// Records excluded for a missing or non-finite feature.
    pub records_excluded: usize,
    /// Records with a score.
    pub records_scored: usize,
    /// Records left unscored because fallback weights were denied.
    pub records_unscored: usize,
    /// Records scored or left unscored for lack of registered sector weights.
    pub fallback_weighted: usize,
    /// Distinct companies in the benchmarked output.
    pub companies: usize,
    /// Years covered, ascending.
    pub years: Vec<i32>,
    /// Benchmark segments with at least one score.
    pub segments: usize,
    /// Distribution of defined scores.
    pub distribution: Option<ScoreDistribution>,
}

impl RunSummary {
    /// Summarize a benchmark run.
    ///
    /// # Arguments
    ///
    /// * `records_loaded` - Records read before derivation
    /// * `records_excluded` - Records dropped during normalization
    /// * `output` - Benchmark output of the run
    pub fn from_output(
        records_loaded: usize,
        records_excluded: usize,
        output: &BenchmarkOutput,
    ) -> Self {
        let scores: Vec<f64> = output.rows.iter().filter_map(|r| r.scored.score).collect();
        let fallback_weighted = output
            .rows
            .iter()
            .filter(|r| r.scored.weight_source == WeightSource::Fallback)
            .count();
        let companies: BTreeSet<&str> = output
            .rows
            .iter()
            .map(|r| r.scored.record.derived.panel.company_id.as_str())
            .collect();
        let years: BTreeSet<i32> = output
            .rows
            .iter()
            .map(|r| r.scored.record.derived.panel.year)
            .collect();

        Self {
            records_loaded,
            records_excluded,
            records_scored: scores.len(),
            records_unscored: output.rows.len() - scores.len(),
            fallback_weighted,
            companies: companies.len(),
            years: years.into_iter().collect(),
            segments: output.segments.len(),
            distribution: ScoreDistribution::from_scores(&scores),
        }
    }

    /// Format as a text block for terminal display.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("\nRun Summary\n");
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("  Records loaded:       {}\n", self.records_loaded));
        output.push_str(&format!("  Records excluded:     {}\n", self.records_excluded));
        output.push_str(&format!("  Records scored:       {}\n", self.records_scored));
        output.push_str(&format!("  Records unscored:     {}\n", self.records_unscored));
        output.push_str(&format!("  Fallback weighted:    {}\n", self.fallback_weighted));
        output.push_str(&format!("  Companies:            {}\n", self.companies));
        output.push_str(&format!("  Segments:             {}\n", self.segments));
        match (self.years.first(), self.years.last()) {
            (Some(first), Some(last)) => {
                output.push_str(&format!("  Years:                {first}-{last}\n"));
            }
            _ => output.push_str("  Years:                none\n"),
        }

        if let Some(d) = &self.distribution {
            output.push_str("\nScore Distribution:\n");
            output.push_str(&"-".repeat(60));
            output.push('\n');
            output.push_str(&format!(
                "{:>12} {:>12} {:>12} {:>12}\n",
                "Min", "Mean", "Median", "Max"
            ));
            output.push_str(&format!(
                "{:>12.2} {:>12.2} {:>12.2} {:>12.2}\n",
                d.min, d.mean, d.median, d.max
            ));
        }

        output
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            records_loaded: 10,
            records_excluded: 1,
            records_scored: 8,
            records_unscored: 1,
            fallback_weighted: 2,
            companies: 4,
            years: vec![2020, 2021, 2022],
            segments: 3,
            distribution: ScoreDistribution::from_scores(&[1.5, 4.0, 9.25, 3.0]),
        }
    }

    #[test]
    fn test_distribution() {
        let d = ScoreDistribution::from_scores(&[1.5, 4.0, 9.25, 3.0]).unwrap();
        assert_eq!(d.min, 1.5);
        assert_eq!(d.max, 9.25);
        assert_eq!(d.median, 3.5);
        assert_eq!(d.mean, 4.4375);
        assert!(ScoreDistribution::from_scores(&[]).is_none());
    }

    #[test]
    fn test_text_rendering() {
        let text = summary().to_text();
        assert!(text.contains("Run Summary"));
        assert!(text.contains("Records scored:       8"));
        assert!(text.contains("2020-2022"));
        assert!(text.contains("Score Distribution"));
        assert_eq!(text, summary().to_string());
    }

    #[test]
    fn test_json_round_trip_fields() {
        let json = serde_json::to_string(&summary()).unwrap();
        assert!(json.contains("\"records_loaded\":10"));
        assert!(json.contains("\"years\":[2020,2021,2022]"));
    }
}
