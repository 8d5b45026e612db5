//! Sector Weight Registry
//!
//! Each sector maps to a 7-element non-negative weight vector aligned with the active
//! variant's slot ordering. Vectors are normalized to sum 1 when the table is built; an
//! all-zero vector and any unregistered sector resolve to equal weights (1/7 per slot).

use crate::slots::{SLOT_COUNT, ScoringVariant, SlotVector};
use peerscore_data::{IsicSection, Sector};
use std::collections::BTreeMap;
use thiserror::Error;

/// Invalid raw weight vectors
#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    /// Vector does not have one weight per slot
    #[error("Weight vector for {sector} has {len} entries, expected 7")]
    WrongLength {
        /// Sector label
        sector: String,
        /// Supplied length
        len: usize,
    },

    /// A weight is negative
    #[error("Weight {index} for {sector} is negative: {value}")]
    Negative {
        /// Sector label
        sector: String,
        /// Slot index
        index: usize,
        /// Offending value
        value: f64,
    },

    /// A weight is NaN or infinite
    #[error("Weight {index} for {sector} is not finite")]
    NonFinite {
        /// Sector label
        sector: String,
        /// Slot index
        index: usize,
    },
}

/// Normalized weight vector, summing to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightVector(SlotVector);

impl WeightVector {
    /// Equal weights, 1/7 per slot
    pub const fn equal() -> Self {
        Self([1.0 / SLOT_COUNT as f64; SLOT_COUNT])
    }

    /// Validate and normalize raw weights. A raw sum of 0 yields equal weights.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError`] when the vector has the wrong length or holds a negative or
    /// non-finite value.
    pub fn normalized(sector: &str, raw: &[f64]) -> Result<Self, WeightError> {
        if raw.len() != SLOT_COUNT {
            return Err(WeightError::WrongLength {
                sector: sector.to_string(),
                len: raw.len(),
            });
        }
        let mut weights = [0.0; SLOT_COUNT];
        for (index, (&value, slot)) in raw.iter().zip(weights.iter_mut()).enumerate() {
            if !value.is_finite() {
                return Err(WeightError::NonFinite {
                    sector: sector.to_string(),
                    index,
                });
            }
            if value < 0.0 {
                return Err(WeightError::Negative {
                    sector: sector.to_string(),
                    index,
                    value,
                });
            }
            *slot = value;
        }

        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            weights.iter_mut().for_each(|w| *w /= total);
            Ok(Self(weights))
        } else {
            Ok(Self::equal())
        }
    }

    /// Weights in slot order
    pub const fn as_array(&self) -> &SlotVector {
        &self.0
    }

    /// Weighted sum against a slot vector
    pub fn dot(&self, values: &SlotVector) -> f64 {
        self.0.iter().zip(values).map(|(w, v)| w * v).sum()
    }
}

/// Where a resolved weight vector came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightSource {
    /// The sector is registered in the table
    Registered,
    /// The sector is unregistered; equal weights apply
    Fallback,
}

impl WeightSource {
    /// Lowercase label
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Fallback => "fallback",
        }
    }
}

/// Result of resolving a sector's weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWeights {
    /// Normalized weights
    pub weights: WeightVector,
    /// Origin of the weights
    pub source: WeightSource,
}

/// Raw peer-variant weights in section order A..U.
///
/// Slot order: sales level, sales growth, employees, employee growth, age, return on
/// capital, branches.
const PEERS_TABLE: [(IsicSection, SlotVector); 21] = [
    (IsicSection::Agriculture, [0.12, 0.10, 0.20, 0.08, 0.20, 0.20, 0.10]),
    (IsicSection::Mining, [0.18, 0.10, 0.12, 0.06, 0.18, 0.28, 0.08]),
    (IsicSection::Manufacturing, [0.20, 0.12, 0.14, 0.08, 0.12, 0.26, 0.08]),
    (IsicSection::Electricity, [0.18, 0.08, 0.12, 0.06, 0.18, 0.30, 0.08]),
    (IsicSection::WaterSupply, [0.16, 0.08, 0.12, 0.06, 0.18, 0.32, 0.08]),
    (IsicSection::Construction, [0.20, 0.14, 0.16, 0.10, 0.12, 0.20, 0.08]),
    (IsicSection::Trade, [0.16, 0.18, 0.12, 0.12, 0.08, 0.14, 0.20]),
    (IsicSection::Transportation, [0.18, 0.14, 0.16, 0.10, 0.10, 0.22, 0.10]),
    (IsicSection::Accommodation, [0.14, 0.20, 0.12, 0.12, 0.08, 0.14, 0.20]),
    (IsicSection::Information, [0.12, 0.28, 0.10, 0.12, 0.06, 0.24, 0.08]),
    (IsicSection::Finance, [0.16, 0.16, 0.12, 0.08, 0.12, 0.28, 0.08]),
    (IsicSection::RealEstate, [0.18, 0.10, 0.12, 0.06, 0.16, 0.30, 0.08]),
    (IsicSection::Professional, [0.14, 0.22, 0.10, 0.12, 0.08, 0.22, 0.12]),
    (IsicSection::Administrative, [0.16, 0.18, 0.12, 0.12, 0.08, 0.18, 0.16]),
    (IsicSection::PublicAdministration, [0.18, 0.06, 0.14, 0.06, 0.24, 0.24, 0.08]),
    (IsicSection::Education, [0.14, 0.18, 0.12, 0.12, 0.16, 0.16, 0.12]),
    (IsicSection::Health, [0.14, 0.22, 0.12, 0.12, 0.12, 0.20, 0.08]),
    (IsicSection::Arts, [0.12, 0.20, 0.12, 0.14, 0.10, 0.16, 0.16]),
    (IsicSection::OtherServices, [0.14, 0.18, 0.12, 0.12, 0.10, 0.18, 0.16]),
    (IsicSection::Households, [0.16, 0.08, 0.18, 0.10, 0.20, 0.20, 0.08]),
    (IsicSection::Extraterritorial, [0.18, 0.06, 0.12, 0.06, 0.24, 0.26, 0.08]),
];

/// Raw tier-aware weights. Sectors not listed fall back to equal weights.
///
/// Slot order: sales level, tier-scaled sales growth, employees, age, return on capital,
/// branches, size tier.
const TIER_AWARE_TABLE: [(IsicSection, SlotVector); 2] = [
    (IsicSection::Manufacturing, [0.20, 0.15, 0.15, 0.10, 0.15, 0.10, 0.15]),
    (IsicSection::Information, [0.15, 0.25, 0.10, 0.05, 0.25, 0.10, 0.10]),
];

/// Read-only registry of per-sector weight vectors.
#[derive(Debug, Clone)]
pub struct SectorWeightTable {
    variant: ScoringVariant,
    weights: BTreeMap<Sector, WeightVector>,
}

impl SectorWeightTable {
    /// An empty table: every sector resolves to equal weights
    pub const fn empty(variant: ScoringVariant) -> Self {
        Self {
            variant,
            weights: BTreeMap::new(),
        }
    }

    /// Built-in table for a scoring variant
    pub fn builtin(variant: ScoringVariant) -> Self {
        let raw: &[(IsicSection, SlotVector)] = match variant {
            ScoringVariant::Peers => &PEERS_TABLE,
            ScoringVariant::TierAware => &TIER_AWARE_TABLE,
        };
        let mut table = Self::empty(variant);
        for (section, weights) in raw {
            // Built-in rows are non-negative and of fixed length.
            if let Ok(vector) = WeightVector::normalized(section.name(), weights) {
                table.weights.insert(Sector::Isic(*section), vector);
            }
        }
        table
    }

    /// Register or replace a sector's weights.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError`] when the raw vector is malformed.
    pub fn with_override(mut self, sector: Sector, raw: &[f64]) -> Result<Self, WeightError> {
        let vector = WeightVector::normalized(&sector.to_string(), raw)?;
        self.weights.insert(sector, vector);
        Ok(self)
    }

    /// Resolve a sector's weights, falling back to equal weights when unregistered
    pub fn resolve(&self, sector: &Sector) -> ResolvedWeights {
        self.weights.get(sector).map_or(
            ResolvedWeights {
                weights: WeightVector::equal(),
                source: WeightSource::Fallback,
            },
            |&weights| ResolvedWeights {
                weights,
                source: WeightSource::Registered,
            },
        )
    }

    /// Whether the sector has its own weights
    pub fn is_registered(&self, sector: &Sector) -> bool {
        self.weights.contains_key(sector)
    }

    /// Registered sectors with their weights, in sector order
    pub fn sectors(&self) -> impl Iterator<Item = (&Sector, &WeightVector)> {
        self.weights.iter()
    }

    /// Scoring variant the slot ordering belongs to
    pub const fn variant(&self) -> ScoringVariant {
        self.variant
    }

    /// Number of registered sectors
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether no sector is registered
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
