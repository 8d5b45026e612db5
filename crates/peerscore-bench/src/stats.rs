//! Peer statistic expressions.
//!
//! Every statistic is a window expression over a partition of the score column, so one
//! lazy query benchmarks all segments at once. Undefined values come back as nulls and
//! are resolved by the caller.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Standard deviation estimator, fixed for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dispersion {
    /// Divide by n - 1
    #[default]
    Sample,
    /// Divide by n
    Population,
}

impl Dispersion {
    /// Delta degrees of freedom passed to `std`
    pub const fn ddof(&self) -> u8 {
        match self {
            Self::Sample => 1,
            Self::Population => 0,
        }
    }
}

/// Direction in which rank 1 is assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankOrder {
    /// Smallest value gets rank 1
    Ascending,
    /// Largest value gets rank 1
    Descending,
}

impl RankOrder {
    /// Average-method rank options; tied values share the mean of the ranks they span
    pub const fn options(&self) -> RankOptions {
        RankOptions {
            method: RankMethod::Average,
            descending: matches!(self, Self::Descending),
        }
    }
}

/// Rank of `column` within each partition, starting at 1.
pub fn average_rank(column: &str, order: RankOrder, partition: &[Expr]) -> Expr {
    col(column).rank(order.options(), None).over(partition)
}

/// Ascending average rank over the partition size, times 100.
///
/// Higher values receive higher percentiles; the maximum is always 100.
pub fn percentile(column: &str, partition: &[Expr]) -> Expr {
    average_rank(column, RankOrder::Ascending, partition)
        / col(column).count().over(partition).cast(DataType::Float64)
        * lit(100.0)
}

/// Standard deviation of `column` within each partition.
pub fn dispersion(column: &str, estimator: Dispersion, partition: &[Expr]) -> Expr {
    col(column).std(estimator.ddof()).over(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use peerscore_data::f64_values;
    use peerscore_factors::round_decimals;
    use rstest::rstest;

    fn frame(groups: &[&str], values: &[f64]) -> LazyFrame {
        DataFrame::new(vec![
            Column::new("g".into(), groups),
            Column::new("v".into(), values),
        ])
        .unwrap()
        .lazy()
    }

    fn evaluate(lf: LazyFrame, expr: Expr) -> Vec<Option<f64>> {
        let df = lf.select([expr.alias("out")]).collect().unwrap();
        f64_values(&df, "out").unwrap()
    }

    #[rstest]
    #[case(Dispersion::Sample, 2.138_089_935_299_395)]
    #[case(Dispersion::Population, 2.0)]
    fn test_dispersion(#[case] estimator: Dispersion, #[case] expected: f64) {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let out = evaluate(frame(&["a"; 8], &values), dispersion("v", estimator, &[col("g")]));
        for v in out {
            assert_relative_eq!(v.unwrap(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_flat_sample_has_zero_std() {
        let out = evaluate(
            frame(&["a"; 3], &[3.0, 3.0, 3.0]),
            dispersion("v", Dispersion::Sample, &[col("g")]),
        );
        assert!(out.iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn test_descending_ranks_with_ties() {
        let out = evaluate(
            frame(&["a", "a", "a", "a", "b"], &[9.0, 7.0, 7.0, 5.0, 1.0]),
            average_rank("v", RankOrder::Descending, &[col("g")]),
        );
        assert_eq!(out, vec![Some(1.0), Some(2.5), Some(2.5), Some(4.0), Some(1.0)]);
    }

    #[test]
    fn test_ascending_ranks_all_tied() {
        let out = evaluate(
            frame(&["a"; 3], &[1.0, 1.0, 1.0]),
            average_rank("v", RankOrder::Ascending, &[col("g")]),
        );
        assert_eq!(out, vec![Some(2.0); 3]);
    }

    #[test]
    fn test_rank_sum() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0];
        let n = values.len() as f64;
        for order in [RankOrder::Ascending, RankOrder::Descending] {
            let total: f64 = evaluate(
                frame(&["a"; 10], &values),
                average_rank("v", order, &[col("g")]),
            )
            .into_iter()
            .flatten()
            .sum();
            assert_relative_eq!(total, n * (n + 1.0) / 2.0);
        }
    }

    #[test]
    fn test_percentiles() {
        let out: Vec<f64> = evaluate(
            frame(
                &["a", "a", "a", "b", "c", "c"],
                &[10.0, 30.0, 20.0, 4.0, 2.0, 2.0],
            ),
            percentile("v", &[col("g")]),
        )
        .into_iter()
        .flatten()
        .map(|p| round_decimals(p, 2))
        .collect();
        assert_eq!(out, vec![33.33, 100.0, 66.67, 100.0, 75.0, 75.0]);
    }

    #[test]
    fn test_percentile_monotonic_in_value() {
        let values = [0.5, 7.25, 3.0, 3.0, 9.99, 0.0, 6.1];
        let pct = evaluate(frame(&["a"; 7], &values), percentile("v", &[col("g")]));
        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] < values[j] {
                    assert!(pct[i] < pct[j]);
                }
            }
        }
    }
}
