//! End-to-end scoring pipeline.
//!
//! Stages run in a fixed order, each consuming the previous stage's complete output:
//! derivation, segment normalization, scoring, benchmarking. The run is a pure function
//! of the panel and the configuration.

use crate::config::{ConfigError, ScoringConfig};
use peerscore_bench::{BenchError, BenchmarkEngine, BenchmarkOutput};
use peerscore_data::{
    DataError, PanelColumns, PanelRecord, RowPolicy, attach_start_years, load_panel,
    load_start_years,
};
use peerscore_factors::{
    DerivedRecord, FactorError, FeatureDeriver, ScoreCalculator, SegmentNormalizer,
};
use peerscore_output::RunSummary;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that end a run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input could not be loaded
    #[error(transparent)]
    Data(#[from] DataError),

    /// Panel violates the one-row-per-company-year schema
    #[error(transparent)]
    Factor(#[from] FactorError),

    /// Peer statistics could not be computed
    #[error(transparent)]
    Bench(#[from] BenchError),
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Benchmarked rows, segment statistics, industry table and trend matrix
    pub benchmark: BenchmarkOutput,
    /// Records dropped for a missing or non-finite feature
    pub excluded: Vec<DerivedRecord>,
    /// Counts and score distribution
    pub summary: RunSummary,
}

/// Configured scoring pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ScoringConfig,
    deriver: FeatureDeriver,
    normalizer: SegmentNormalizer,
    calculator: ScoreCalculator,
    engine: BenchmarkEngine,
}

impl Pipeline {
    /// Build every stage from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] when the configuration is invalid.
    pub fn new(config: ScoringConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let table = config.weight_table()?;
        debug!(
            variant = config.variant.name(),
            registered_sectors = table.len(),
            "built weight table"
        );

        Ok(Self {
            deriver: FeatureDeriver::new(config.age_convention),
            normalizer: SegmentNormalizer::new(
                config.segment_mode,
                config.variant,
                config.tier_growth_thresholds,
            ),
            calculator: ScoreCalculator::new(table, config.fallback),
            engine: BenchmarkEngine::new(config.dispersion),
            config,
        })
    }

    /// Configuration the pipeline was built from
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score calculator, including the resolved weight table
    pub const fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    /// Score and benchmark a panel.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Factor`] for an empty company identifier or a duplicated
    /// (company, year) pair, and [`PipelineError::Bench`] when peer statistics fail to
    /// evaluate.
    pub fn run(&self, panel: Vec<PanelRecord>) -> Result<RunOutput, PipelineError> {
        let loaded = panel.len();

        let derived = self.deriver.derive(panel)?;
        let normalized = self.normalizer.normalize(derived)?;
        let scored = self.calculator.score(normalized.records);
        let benchmark = self.engine.run(scored, &normalized.excluded)?;

        let summary = RunSummary::from_output(loaded, normalized.excluded.len(), &benchmark);
        info!(
            loaded,
            scored = summary.records_scored,
            unscored = summary.records_unscored,
            excluded = summary.records_excluded,
            segments = summary.segments,
            "pipeline complete"
        );

        Ok(RunOutput {
            benchmark,
            excluded: normalized.excluded,
            summary,
        })
    }
}

/// Load a panel and, when given, merge start years from a companies table.
///
/// The companies table is keyed by the panel's company identifier column and reads the
/// start year from the panel's start year column name (`start_year` when unset).
///
/// # Errors
///
/// Returns [`PipelineError::Data`] when either file cannot be loaded.
pub fn load_inputs(
    panel_path: &Path,
    companies_path: Option<&Path>,
    columns: &PanelColumns,
    policy: RowPolicy,
) -> Result<Vec<PanelRecord>, PipelineError> {
    let mut records = load_panel(panel_path, columns, policy)?;
    if let Some(path) = companies_path {
        let start_column = columns.start_year.as_deref().unwrap_or("start_year");
        let start_years = load_start_years(path, &columns.company_id, start_column)?;
        let updated = attach_start_years(&mut records, &start_years);
        debug!(updated, "attached start years");
    }
    Ok(records)
}
