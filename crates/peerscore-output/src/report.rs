//! Report generation for peerscore runs.

use crate::summary::RunSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The builder was given no run summary.
    #[error("Report has no run summary")]
    MissingSummary,
}

/// A report of one scoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report title, usually the input panel name.
    pub title: String,

    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// Run counts and score distribution.
    pub summary: RunSummary,

    /// Effective configuration of the run (JSON format).
    pub config: serde_json::Value,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(title: String, summary: RunSummary, config: serde_json::Value) -> Self {
        Self {
            title,
            generated_at: Utc::now(),
            summary,
            config,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to a file.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    summary: Option<RunSummary>,
    config: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the run summary.
    pub fn summary(mut self, summary: RunSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Set the configuration contents.
    pub fn config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        let summary = self.summary.ok_or(ReportError::MissingSummary)?;
        Ok(Report::new(
            self.title.unwrap_or_else(|| "peerscore".to_string()),
            summary,
            self.config.unwrap_or(serde_json::Value::Null),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            records_loaded: 2,
            records_excluded: 0,
            records_scored: 2,
            records_unscored: 0,
            fallback_weighted: 0,
            companies: 2,
            years: vec![2021],
            segments: 1,
            distribution: None,
        }
    }

    #[test]
    fn test_report_creation() {
        let report = Report::new(
            "panel.csv".to_string(),
            summary(),
            serde_json::json!({"variant": "peers"}),
        );

        assert_eq!(report.title, "panel.csv");
        assert_eq!(report.summary.records_scored, 2);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"generated_at\""));
        assert!(json.contains("\"variant\": \"peers\""));
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .title("run")
            .summary(summary())
            .config(serde_json::json!({"segment_mode": "sector-year"}))
            .build()
            .unwrap();

        assert_eq!(report.title, "run");
        assert_eq!(report.config["segment_mode"], "sector-year");
    }

    #[test]
    fn test_report_builder_requires_summary() {
        assert!(matches!(
            ReportBuilder::new().title("run").build(),
            Err(ReportError::MissingSummary)
        ));
    }
}
