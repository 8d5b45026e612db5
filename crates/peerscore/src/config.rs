//! Run configuration.
//!
//! Every option has a default, so an empty JSON object is a valid configuration. The
//! weight table is built once from the configured variant's built-in table with any
//! overrides applied on top.

use peerscore_bench::Dispersion;
use peerscore_data::Sector;
use peerscore_factors::{
    AgeConvention, FallbackPolicy, ScoringVariant, SectorWeightTable, SegmentMode,
    TierGrowthThresholds, WeightError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A weight override has an empty sector key
    #[error("Weight override has an empty sector key")]
    EmptySectorKey,

    /// A weight override is malformed
    #[error("Invalid weight override: {0}")]
    Weights(#[from] WeightError),

    /// A tier growth threshold is not a positive finite number
    #[error("Growth threshold for {tier} tier must be positive, got {value}")]
    InvalidThreshold {
        /// Tier name
        tier: &'static str,
        /// Offending value
        value: f64,
    },
}

/// Options of one scoring run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Normalization segment key
    pub segment_mode: SegmentMode,
    /// Feature slot ordering and built-in weight table
    pub variant: ScoringVariant,
    /// Whether unregistered sectors are scored with equal weights
    pub fallback: FallbackPolicy,
    /// Standard deviation estimator for benchmarks
    pub dispersion: Dispersion,
    /// How company age is counted
    pub age_convention: AgeConvention,
    /// Full-credit growth per size tier, used by tier-scaled slots
    pub tier_growth_thresholds: TierGrowthThresholds,
    /// Raw weights per sector, keyed by section letter, English or Arabic name
    pub weight_overrides: BTreeMap<String, Vec<f64>>,
}

impl ScoringConfig {
    /// Load and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if parsing or validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check thresholds and weight overrides.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = &self.tier_growth_thresholds;
        for (tier, value) in [("small", thresholds.small), ("medium", thresholds.medium)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidThreshold { tier, value });
            }
        }
        self.weight_table().map(|_| ())
    }

    /// Build the weight table for this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override is malformed.
    pub fn weight_table(&self) -> Result<SectorWeightTable, ConfigError> {
        let mut table = SectorWeightTable::builtin(self.variant);
        for (key, raw) in &self.weight_overrides {
            if key.trim().is_empty() {
                return Err(ConfigError::EmptySectorKey);
            }
            table = table.with_override(Sector::parse(key), raw)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peerscore_data::IsicSection;

    #[test]
    fn test_empty_object_is_default() {
        let config = ScoringConfig::from_json("{}").unwrap();
        assert_eq!(config, ScoringConfig::default());
        assert_eq!(config.variant, ScoringVariant::Peers);
        assert_eq!(config.segment_mode, SegmentMode::SectorYear);
        assert_eq!(config.dispersion, Dispersion::Sample);
    }

    #[test]
    fn test_full_config() {
        let config = ScoringConfig::from_json(
            r#"{
                "segment_mode": "sector-year-tier",
                "variant": "tier-aware",
                "fallback": "deny",
                "dispersion": "population",
                "age_convention": "inclusive",
                "tier_growth_thresholds": { "small": 0.4, "medium": 0.2 },
                "weight_overrides": { "C": [1, 1, 1, 1, 1, 1, 1] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.segment_mode, SegmentMode::SectorYearTier);
        assert_eq!(config.variant, ScoringVariant::TierAware);
        assert_eq!(config.fallback, FallbackPolicy::Deny);
        assert_eq!(config.dispersion, Dispersion::Population);
        assert_eq!(config.age_convention, AgeConvention::Inclusive);
        assert_eq!(config.tier_growth_thresholds.small, 0.4);
    }

    #[test]
    fn test_override_by_any_label() {
        let config = ScoringConfig::from_json(
            r#"{ "weight_overrides": {
                "Education": [0, 0, 0, 0, 0, 0, 1],
                "التشييد والبناء": [1, 0, 0, 0, 0, 0, 0]
            } }"#,
        )
        .unwrap();
        let table = config.weight_table().unwrap();

        let education = table.resolve(&Sector::Isic(IsicSection::Education));
        assert_eq!(education.weights.as_array()[6], 1.0);
        let construction = table.resolve(&Sector::Isic(IsicSection::Construction));
        assert_eq!(construction.weights.as_array()[0], 1.0);
    }

    #[test]
    fn test_rejects_malformed_override() {
        let err = ScoringConfig::from_json(r#"{ "weight_overrides": { "G": [0.5, 0.5] } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Weights(WeightError::WrongLength { len: 2, .. })
        ));

        let err =
            ScoringConfig::from_json(r#"{ "weight_overrides": { " ": [1, 1, 1, 1, 1, 1, 1] } }"#)
                .unwrap_err();
        assert!(matches!(err, ConfigError::EmptySectorKey));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let err = ScoringConfig::from_json(
            r#"{ "tier_growth_thresholds": { "small": 0.3, "medium": 0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidThreshold { tier: "medium", .. }
        ));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(matches!(
            ScoringConfig::from_json(r#"{ "segment": "sector-year" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ScoringConfig::from_path(Path::new("/nonexistent/peerscore.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
