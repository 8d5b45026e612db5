//! Weighted scoring of normalized records.

use crate::math::round_decimals;
use crate::normalize::NormalizedRecord;
use crate::weights::{SectorWeightTable, WeightSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Whether unregistered sectors may be scored with equal weights
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Score unregistered sectors with equal weights
    #[default]
    Allow,
    /// Leave unregistered sectors unscored
    Deny,
}

/// A normalized record with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    /// Normalized record
    pub record: NormalizedRecord,
    /// Score in [0, 10] rounded to 2 decimals; `None` when the sector is unregistered and
    /// fallback is denied
    pub score: Option<f64>,
    /// Where the weights came from
    pub weight_source: WeightSource,
}

/// Combines normalized slots with sector weights into a 0-10 score
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    table: SectorWeightTable,
    fallback: FallbackPolicy,
}

impl ScoreCalculator {
    /// Create a calculator over a weight table
    pub const fn new(table: SectorWeightTable, fallback: FallbackPolicy) -> Self {
        Self { table, fallback }
    }

    /// Weight table in use
    pub const fn table(&self) -> &SectorWeightTable {
        &self.table
    }

    /// Fallback policy in use
    pub const fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Score one record
    pub fn score_one(&self, record: NormalizedRecord) -> ScoredRecord {
        let resolved = self.table.resolve(&record.derived.panel.sector);
        let score = match (resolved.source, self.fallback) {
            (WeightSource::Fallback, FallbackPolicy::Deny) => None,
            _ => {
                let raw = 10.0 * resolved.weights.dot(&record.normalized);
                Some(round_decimals(raw, 2).clamp(0.0, 10.0))
            }
        };
        ScoredRecord {
            record,
            score,
            weight_source: resolved.source,
        }
    }

    /// Score every record, preserving order
    pub fn score(&self, records: Vec<NormalizedRecord>) -> Vec<ScoredRecord> {
        let scored: Vec<ScoredRecord> = records.into_iter().map(|r| self.score_one(r)).collect();

        let fallback = scored
            .iter()
            .filter(|r| r.weight_source == WeightSource::Fallback)
            .count();
        if fallback > 0 {
            match self.fallback {
                FallbackPolicy::Allow => {
                    warn!(records = fallback, "scored unregistered sectors with equal weights");
                }
                FallbackPolicy::Deny => {
                    warn!(records = fallback, "left unregistered sectors unscored");
                }
            }
        }
        debug!(records = scored.len(), fallback, "scored records");

        scored
    }
}
