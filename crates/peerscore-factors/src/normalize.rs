//! Segment Normalization
//!
//! Records are partitioned into segments by exact equality on the segment key, then every
//! min-max slot is rescaled to [0, 1] using that segment's minimum and maximum. A segment
//! whose minimum equals its maximum (including a single-member segment) maps every value
//! to 0: one company cannot be distinguished from peers it does not have.

use crate::derive::DerivedRecord;
use crate::error::FactorError;
use crate::slots::{SLOT_COUNT, ScoringVariant, SlotKind, SlotVector};
use peerscore_data::{PanelRecord, Sector, SizeTier, f64_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which fields form the segment key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentMode {
    /// (year, sector)
    #[default]
    SectorYear,
    /// (year, sector, size tier)
    SectorYearTier,
}

/// Grouping key for normalization
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentKey {
    /// Year
    pub year: i32,
    /// Sector
    pub sector: Sector,
    /// Size tier, present only in [`SegmentMode::SectorYearTier`]
    pub size_tier: Option<SizeTier>,
}

impl SegmentKey {
    /// Segment key of a record under the given mode
    pub fn of(record: &PanelRecord, mode: SegmentMode) -> Self {
        Self {
            year: record.year,
            sector: record.sector.clone(),
            size_tier: match mode {
                SegmentMode::SectorYear => None,
                SegmentMode::SectorYearTier => Some(record.size_tier),
            },
        }
    }
}

/// Growth levels that earn full credit in tier-scaled growth slots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierGrowthThresholds {
    /// Full-credit growth for small companies (default: 0.30)
    pub small: f64,
    /// Full-credit growth for medium companies (default: 0.15)
    pub medium: f64,
}

impl Default for TierGrowthThresholds {
    fn default() -> Self {
        Self {
            small: 0.30,
            medium: 0.15,
        }
    }
}

impl TierGrowthThresholds {
    /// Scale growth by the tier's threshold into [0, 1].
    ///
    /// Unknown tiers sit at indicator 0.5 and use the medium threshold.
    pub fn scale(&self, growth: f64, tier: SizeTier) -> f64 {
        let threshold = if tier.indicator() >= 0.5 {
            self.medium
        } else {
            self.small
        };
        let scaled = growth / threshold;
        if scaled.is_finite() {
            scaled.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Min-max rescale a column to [0, 1] within each partition.
///
/// Maps to 0 where the partition's values are all equal (or there is only one).
pub fn min_max(column: &str, partition: &[Expr]) -> Expr {
    let min = col(column).min().over(partition);
    let range = col(column).max().over(partition) - min.clone();
    when(range.clone().gt(lit(0.0)))
        .then((col(column) - min) / range)
        .otherwise(lit(0.0))
        .alias(column)
}

fn slot_column(j: usize) -> String {
    format!("slot_{j}")
}

/// A derived record with its normalized slot vector
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// Derived record
    pub derived: DerivedRecord,
    /// Normalization segment
    pub segment: SegmentKey,
    /// Normalized values in variant slot order, each in [0, 1]
    pub normalized: SlotVector,
}

/// Result of normalizing a panel
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutput {
    /// Normalized records, in input order
    pub records: Vec<NormalizedRecord>,
    /// Records excluded because a slot value was missing or not finite
    pub excluded: Vec<DerivedRecord>,
    /// Number of distinct segments
    pub segments: usize,
}

/// Normalizes the active variant's slots within segments
#[derive(Debug, Clone, Default)]
pub struct SegmentNormalizer {
    mode: SegmentMode,
    variant: ScoringVariant,
    thresholds: TierGrowthThresholds,
}

impl SegmentNormalizer {
    /// Create a normalizer
    pub const fn new(
        mode: SegmentMode,
        variant: ScoringVariant,
        thresholds: TierGrowthThresholds,
    ) -> Self {
        Self {
            mode,
            variant,
            thresholds,
        }
    }

    /// Segment mode in use
    pub const fn mode(&self) -> SegmentMode {
        self.mode
    }

    /// Scoring variant in use
    pub const fn variant(&self) -> ScoringVariant {
        self.variant
    }

    /// Normalize every record's slots within its segment.
    ///
    /// A record lacking a finite value for any slot is excluded from the output rather than
    /// failing the run; it also takes no part in its segment's min/max.
    ///
    /// # Errors
    ///
    /// Returns [`FactorError::Polars`] when the segment expressions fail to evaluate.
    pub fn normalize(&self, records: Vec<DerivedRecord>) -> Result<NormalizeOutput, FactorError> {
        let slots = self.variant.slots();

        let mut kept: Vec<(DerivedRecord, SlotVector)> = Vec::with_capacity(records.len());
        let mut excluded = Vec::new();

        for record in records {
            let mut raw = [0.0; SLOT_COUNT];
            let mut complete = true;
            for (value, slot) in raw.iter_mut().zip(slots) {
                match record.value(slot) {
                    Some(v) => *value = v,
                    None => {
                        warn!(
                            company = %record.panel.company_id,
                            year = record.panel.year,
                            slot = slot.name(),
                            "excluding record with missing feature"
                        );
                        complete = false;
                        break;
                    }
                }
            }
            if complete {
                kept.push((record, raw));
            } else {
                excluded.push(record);
            }
        }

        let (normalized, segment_count) = if kept.is_empty() {
            (Vec::new(), 0)
        } else {
            self.scale(&kept)?
        };

        let records: Vec<NormalizedRecord> = kept
            .into_iter()
            .zip(normalized)
            .map(|((derived, _), normalized)| NormalizedRecord {
                segment: SegmentKey::of(&derived.panel, self.mode),
                derived,
                normalized,
            })
            .collect();

        debug!(
            records = records.len(),
            excluded = excluded.len(),
            segments = segment_count,
            mode = ?self.mode,
            "normalized features"
        );

        Ok(NormalizeOutput {
            records,
            excluded,
            segments: segment_count,
        })
    }

    fn partition(&self) -> Vec<Expr> {
        match self.mode {
            SegmentMode::SectorYear => vec![col("year"), col("sector")],
            SegmentMode::SectorYearTier => vec![col("year"), col("sector"), col("size_tier")],
        }
    }

    /// Slot vectors aligned with `kept`, plus the number of distinct segments.
    fn scale(
        &self,
        kept: &[(DerivedRecord, SlotVector)],
    ) -> Result<(Vec<SlotVector>, usize), FactorError> {
        let slots = self.variant.slots();

        let mut columns = vec![
            Column::new(
                "year".into(),
                kept.iter().map(|(r, _)| r.panel.year).collect::<Vec<_>>(),
            ),
            Column::new(
                "sector".into(),
                kept.iter()
                    .map(|(r, _)| r.panel.sector.partition_key())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "size_tier".into(),
                kept.iter()
                    .map(|(r, _)| r.panel.size_tier.as_str())
                    .collect::<Vec<_>>(),
            ),
        ];
        for j in 0..SLOT_COUNT {
            columns.push(Column::new(
                slot_column(j).into(),
                kept.iter().map(|(_, raw)| raw[j]).collect::<Vec<_>>(),
            ));
        }

        let partition = self.partition();
        let frame = DataFrame::new(columns)?;
        let segments = frame
            .clone()
            .lazy()
            .group_by(partition.clone())
            .agg([col("year").count().alias("members")])
            .collect()?
            .height();

        let scaled: Vec<Expr> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.kind() == SlotKind::MinMax)
            .map(|(j, _)| min_max(&slot_column(j), &partition))
            .collect();
        let frame = frame.lazy().with_columns(scaled).collect()?;

        let mut normalized = vec![[0.0; SLOT_COUNT]; kept.len()];
        for (j, slot) in slots.iter().enumerate() {
            match slot.kind() {
                SlotKind::MinMax => {
                    let values = f64_values(&frame, &slot_column(j))?;
                    for (row, value) in normalized.iter_mut().zip(values) {
                        row[j] = value
                            .filter(|v| v.is_finite())
                            .map_or(0.0, |v| v.clamp(0.0, 1.0));
                    }
                }
                SlotKind::TierScaled => {
                    for (row, (record, raw)) in normalized.iter_mut().zip(kept) {
                        row[j] = self.thresholds.scale(raw[j], record.panel.size_tier);
                    }
                }
                SlotKind::Categorical => {
                    for (row, (_, raw)) in normalized.iter_mut().zip(kept) {
                        row[j] = raw[j].clamp(0.0, 1.0);
                    }
                }
            }
        }

        Ok((normalized, segments))
    }
}
