//! Feature Slot Registry
//!
//! A score is a weighted sum over exactly seven feature slots. Which features occupy the
//! slots, and in which order, is fixed by a [`ScoringVariant`] for the whole run. Weight
//! vectors are indexed by the same ordering, so reordering slots here reorders both sides.

use serde::{Deserialize, Serialize};

/// Number of weighted slots in every scoring variant.
pub const SLOT_COUNT: usize = 7;

/// One value per slot, in variant order.
pub type SlotVector = [f64; SLOT_COUNT];

/// How a slot's raw value is mapped into [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Min-max rescaling within the record's segment
    MinMax,
    /// Growth divided by a size-tier threshold and clipped to [0, 1]
    TierScaled,
    /// Fixed categorical encoding, already in [0, 1]
    Categorical,
}

impl SlotKind {
    /// Short label for listings
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MinMax => "min-max",
            Self::TierScaled => "tier-scaled",
            Self::Categorical => "categorical",
        }
    }
}

/// Features that can occupy a scoring slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSlot {
    /// Sales level
    SalesLevel,
    /// Year-over-year sales growth
    SalesGrowth,
    /// Sales growth scaled by a size-tier threshold
    TierScaledSalesGrowth,
    /// Employee count
    Employees,
    /// Year-over-year employee growth
    EmployeeGrowth,
    /// Company age in years
    Age,
    /// Revenue over paid-in capital
    ReturnOnCapital,
    /// Branch count
    Branches,
    /// Size tier indicator (small 0, unknown 0.5, medium 1)
    SizeTier,
}

impl FeatureSlot {
    /// Slot name (unique identifier)
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SalesLevel => "sales_level",
            Self::SalesGrowth => "sales_growth",
            Self::TierScaledSalesGrowth => "tier_scaled_sales_growth",
            Self::Employees => "employees",
            Self::EmployeeGrowth => "employee_growth",
            Self::Age => "age",
            Self::ReturnOnCapital => "return_on_capital",
            Self::Branches => "branches",
            Self::SizeTier => "size_tier",
        }
    }

    /// Normalization applied to this slot
    pub const fn kind(&self) -> SlotKind {
        match self {
            Self::TierScaledSalesGrowth => SlotKind::TierScaled,
            Self::SizeTier => SlotKind::Categorical,
            _ => SlotKind::MinMax,
        }
    }

    /// Brief description of what the slot measures
    pub const fn description(&self) -> &'static str {
        match self {
            Self::SalesLevel => "Sales level relative to segment peers",
            Self::SalesGrowth => "Year-over-year sales growth relative to segment peers",
            Self::TierScaledSalesGrowth => {
                "Sales growth as a fraction of the tier's full-credit threshold"
            }
            Self::Employees => "Headcount relative to segment peers",
            Self::EmployeeGrowth => "Year-over-year headcount growth relative to segment peers",
            Self::Age => "Years in operation relative to segment peers",
            Self::ReturnOnCapital => "Revenue per unit of paid-in capital relative to peers",
            Self::Branches => "Branch count relative to segment peers",
            Self::SizeTier => "Size tier encoded as small 0, unknown 0.5, medium 1",
        }
    }
}

/// Slot metadata
#[derive(Debug, Clone)]
pub struct SlotInfo {
    /// The slot
    pub slot: FeatureSlot,
    /// Normalization kind
    pub kind: SlotKind,
    /// Brief description
    pub description: &'static str,
}

/// Get metadata for every feature that can occupy a slot
pub fn available_slots() -> Vec<SlotInfo> {
    [
        FeatureSlot::SalesLevel,
        FeatureSlot::SalesGrowth,
        FeatureSlot::TierScaledSalesGrowth,
        FeatureSlot::Employees,
        FeatureSlot::EmployeeGrowth,
        FeatureSlot::Age,
        FeatureSlot::ReturnOnCapital,
        FeatureSlot::Branches,
        FeatureSlot::SizeTier,
    ]
    .into_iter()
    .map(|slot| SlotInfo {
        slot,
        kind: slot.kind(),
        description: slot.description(),
    })
    .collect()
}

/// Get slot metadata by name
pub fn get_slot_info(name: &str) -> Option<SlotInfo> {
    available_slots().into_iter().find(|s| s.slot.name() == name)
}

/// Scoring variant: fixes the feature occupying each of the seven slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringVariant {
    /// Peer-normalized scoring: every slot min-max normalized within its segment
    #[default]
    Peers,
    /// Tier-aware growth scoring: growth scaled by size-tier thresholds, tier as a feature
    TierAware,
}

impl ScoringVariant {
    /// Slot ordering for this variant
    pub const fn slots(&self) -> [FeatureSlot; SLOT_COUNT] {
        match self {
            Self::Peers => [
                FeatureSlot::SalesLevel,
                FeatureSlot::SalesGrowth,
                FeatureSlot::Employees,
                FeatureSlot::EmployeeGrowth,
                FeatureSlot::Age,
                FeatureSlot::ReturnOnCapital,
                FeatureSlot::Branches,
            ],
            Self::TierAware => [
                FeatureSlot::SalesLevel,
                FeatureSlot::TierScaledSalesGrowth,
                FeatureSlot::Employees,
                FeatureSlot::Age,
                FeatureSlot::ReturnOnCapital,
                FeatureSlot::Branches,
                FeatureSlot::SizeTier,
            ],
        }
    }

    /// Variant name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Peers => "peers",
            Self::TierAware => "tier-aware",
        }
    }
}
