#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/peerscore/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod derive;
pub mod error;
pub mod math;
pub mod normalize;
pub mod score;
pub mod slots;
pub mod weights;

pub use derive::{AgeConvention, DerivedFeatures, DerivedRecord, FeatureDeriver};
pub use error::FactorError;
pub use math::round_decimals;
pub use normalize::{
    NormalizeOutput, NormalizedRecord, SegmentKey, SegmentMode, SegmentNormalizer,
    TierGrowthThresholds, min_max,
};
pub use score::{FallbackPolicy, ScoreCalculator, ScoredRecord};
pub use slots::{
    FeatureSlot, SLOT_COUNT, ScoringVariant, SlotInfo, SlotKind, SlotVector, available_slots,
    get_slot_info,
};
pub use weights::{ResolvedWeights, SectorWeightTable, WeightError, WeightSource, WeightVector};

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
