#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/peerscore/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod history;
pub mod industry;
pub mod segment;
pub mod stats;
pub mod trend;

pub use engine::{BenchmarkEngine, BenchmarkOutput, BenchmarkedRow};
pub use error::BenchError;
pub use history::{HistoricalDelta, historical_deltas};
pub use industry::{IndustryRow, industry_table};
pub use segment::{BenchmarkRecord, IndustryYear, SegmentStats, benchmark_segments};
pub use stats::{Dispersion, RankOrder, average_rank, dispersion, percentile};
pub use trend::TrendMatrix;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
