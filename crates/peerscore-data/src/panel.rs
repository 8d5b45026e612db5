//! Company-year panel records.

use crate::sector::Sector;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tax or registration identifier, unique per company.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    /// Create a company identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CompanyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// SME size classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTier {
    /// Small enterprise
    Small,
    /// Medium enterprise
    Medium,
    /// Tier not reported or not recognised
    Unknown,
}

impl SizeTier {
    /// Parse a tier label. Accepts English and Arabic labels; anything else is unknown.
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.contains("medium") || label.contains("متوسط") {
            Self::Medium
        } else if label.contains("small") || label.contains("صغير") {
            Self::Small
        } else {
            Self::Unknown
        }
    }

    /// Numeric indicator used as a categorical scoring feature.
    pub const fn indicator(&self) -> f64 {
        match self {
            Self::Small => 0.0,
            Self::Unknown => 0.5,
            Self::Medium => 1.0,
        }
    }

    /// Lowercase label.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One company-year observation as supplied by the input table.
///
/// Raw numeric fields are optional: blanks and unparseable cells arrive as `None` and are
/// resolved by the feature derivation fallbacks, never rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRecord {
    /// Company identifier
    pub company_id: CompanyId,
    /// Observation year
    pub year: i32,
    /// Sector assignment
    pub sector: Sector,
    /// Size tier
    pub size_tier: SizeTier,
    /// Sales
    pub sales: Option<f64>,
    /// Revenue
    pub revenue: Option<f64>,
    /// Employee count
    pub employees: Option<f64>,
    /// Paid-in capital
    pub capital: Option<f64>,
    /// Branch count
    pub branches: Option<f64>,
    /// Founding year, when known
    pub start_year: Option<i32>,
}

impl PanelRecord {
    /// Create a record with identity fields only.
    pub fn new(
        company_id: impl Into<CompanyId>,
        year: i32,
        sector: Sector,
        size_tier: SizeTier,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            year,
            sector,
            size_tier,
            sales: None,
            revenue: None,
            employees: None,
            capital: None,
            branches: None,
            start_year: None,
        }
    }

    /// Set sales.
    pub const fn with_sales(mut self, sales: f64) -> Self {
        self.sales = Some(sales);
        self
    }

    /// Set revenue.
    pub const fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = Some(revenue);
        self
    }

    /// Set employee count.
    pub const fn with_employees(mut self, employees: f64) -> Self {
        self.employees = Some(employees);
        self
    }

    /// Set paid-in capital.
    pub const fn with_capital(mut self, capital: f64) -> Self {
        self.capital = Some(capital);
        self
    }

    /// Set branch count.
    pub const fn with_branches(mut self, branches: f64) -> Self {
        self.branches = Some(branches);
        self
    }

    /// Set founding year.
    pub const fn with_start_year(mut self, start_year: i32) -> Self {
        self.start_year = Some(start_year);
        self
    }
}
