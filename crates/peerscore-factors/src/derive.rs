//! Feature Derivation
//!
//! Computes per-company time-series features from raw panel fields. Records are sorted by
//! (company, year) before anything else; the input order is never trusted.
//!
//! Fallbacks:
//! - growth is 0 for a company's first observed year, when either value is missing, when
//!   the prior value is 0, or when the ratio is not finite
//! - return on capital is 0 when capital is 0 or missing
//! - missing raw numerics count as 0
//! - age uses the company's first observed year when no start year is known

use crate::error::FactorError;
use crate::math::round_decimals;
use crate::slots::FeatureSlot;
use peerscore_data::{PanelRecord, f64_values, i32_values, row_order};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How company age is counted from the start year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgeConvention {
    /// `year - start_year`, floored at 1
    #[default]
    Elapsed,
    /// `year - start_year + 1`, floored at 1 (the founding year counts as year one)
    Inclusive,
}

impl AgeConvention {
    /// Age of a company in `year` given its start year
    pub const fn age(&self, year: i32, start_year: i32) -> i32 {
        let elapsed = year - start_year;
        let age = match self {
            Self::Elapsed => elapsed,
            Self::Inclusive => elapsed + 1,
        };
        if age < 1 { 1 } else { age }
    }
}

/// Feature values for one company-year, all finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// Sales (0 when missing)
    pub sales: f64,
    /// Revenue (0 when missing)
    pub revenue: f64,
    /// Employee count (0 when missing)
    pub employees: f64,
    /// Paid-in capital (0 when missing)
    pub capital: f64,
    /// Branch count (0 when missing)
    pub branches: f64,
    /// Year-over-year sales growth as a fraction
    pub sales_growth: f64,
    /// Year-over-year employee growth as a fraction
    pub employee_growth: f64,
    /// Age in years, at least 1
    pub age: i32,
    /// Revenue over paid-in capital
    pub return_on_capital: f64,
    /// Year-over-year sales change in percent, rounded to 2 decimals
    pub sales_change_pct: f64,
}

/// A panel record with its derived features attached.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    /// Source record
    pub panel: PanelRecord,
    /// Derived features
    pub features: DerivedFeatures,
}

impl DerivedRecord {
    /// Raw (pre-normalization) value for a slot, or `None` if it is not finite
    pub fn value(&self, slot: FeatureSlot) -> Option<f64> {
        let f = &self.features;
        let value = match slot {
            FeatureSlot::SalesLevel => f.sales,
            FeatureSlot::SalesGrowth | FeatureSlot::TierScaledSalesGrowth => f.sales_growth,
            FeatureSlot::Employees => f.employees,
            FeatureSlot::EmployeeGrowth => f.employee_growth,
            FeatureSlot::Age => f64::from(f.age),
            FeatureSlot::ReturnOnCapital => f.return_on_capital,
            FeatureSlot::Branches => f.branches,
            FeatureSlot::SizeTier => self.panel.size_tier.indicator(),
        };
        value.is_finite().then_some(value)
    }
}

/// Relative change from the lagged column to the current one.
///
/// Null when either side is missing or the prior value is 0.
fn growth(current: &str, previous: &str) -> Expr {
    when(
        col(current)
            .is_not_null()
            .and(col(previous).fill_null(lit(0.0)).neq(lit(0.0))),
    )
    .then((col(current) - col(previous)) / col(previous))
    .otherwise(lit(NULL))
}

/// Finite value or 0.
fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> f64 {
    match denominator {
        Some(d) if d != 0.0 => finite_or_zero(Some(numerator.unwrap_or(0.0) / d)),
        _ => 0.0,
    }
}

/// Derives growth, age and ratio features for a whole panel.
#[derive(Debug, Clone, Default)]
pub struct FeatureDeriver {
    age_convention: AgeConvention,
}

impl FeatureDeriver {
    /// Create a deriver with the given age convention
    pub const fn new(age_convention: AgeConvention) -> Self {
        Self { age_convention }
    }

    /// Age convention in use
    pub const fn age_convention(&self) -> AgeConvention {
        self.age_convention
    }

    /// Derive features for every record.
    ///
    /// The output is sorted by (company, year) and contains exactly one derived record per
    /// input record.
    ///
    /// # Errors
    ///
    /// Returns [`FactorError::EmptyCompanyId`] or [`FactorError::DuplicateRecord`] when the
    /// panel violates the one-row-per-(company, year) schema, and [`FactorError::Polars`]
    /// when the lag expressions fail to evaluate.
    pub fn derive(&self, records: Vec<PanelRecord>) -> Result<Vec<DerivedRecord>, FactorError> {
        if let Some(r) = records.iter().find(|r| r.company_id.as_str().trim().is_empty()) {
            return Err(FactorError::EmptyCompanyId { year: r.year });
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let frame = DataFrame::new(vec![
            Column::new(
                "company_id".into(),
                records.iter().map(|r| r.company_id.as_str()).collect::<Vec<_>>(),
            ),
            Column::new("year".into(), records.iter().map(|r| r.year).collect::<Vec<_>>()),
            Column::new("sales".into(), records.iter().map(|r| r.sales).collect::<Vec<_>>()),
            Column::new(
                "employees".into(),
                records.iter().map(|r| r.employees).collect::<Vec<_>>(),
            ),
        ])?;

        // Sort by company and year so the lag is the previous observed year
        let frame = frame
            .lazy()
            .with_row_index("row", None)
            .sort(["company_id", "year"], Default::default())
            .with_columns([
                col("sales")
                    .shift(lit(1))
                    .over([col("company_id")])
                    .alias("sales_lag"),
                col("employees")
                    .shift(lit(1))
                    .over([col("company_id")])
                    .alias("employees_lag"),
                col("year").min().over([col("company_id")]).alias("first_year"),
            ])
            .with_columns([
                growth("sales", "sales_lag").alias("sales_growth"),
                growth("employees", "employees_lag").alias("employee_growth"),
            ])
            .collect()?;

        let order = row_order(&frame, "row")?;
        let sales_growth = f64_values(&frame, "sales_growth")?;
        let employee_growth = f64_values(&frame, "employee_growth")?;
        let first_year = i32_values(&frame, "first_year")?;

        if let Some(pair) = order.windows(2).find(|w| {
            let (a, b) = (&records[w[0]], &records[w[1]]);
            a.company_id == b.company_id && a.year == b.year
        }) {
            let record = &records[pair[0]];
            return Err(FactorError::DuplicateRecord {
                company_id: record.company_id.to_string(),
                year: record.year,
            });
        }

        let mut pending: Vec<Option<PanelRecord>> = records.into_iter().map(Some).collect();
        let mut derived = Vec::with_capacity(order.len());
        let mut companies = 0usize;

        for (pos, &idx) in order.iter().enumerate() {
            let Some(record) = pending.get_mut(idx).and_then(Option::take) else {
                continue;
            };
            if derived
                .last()
                .is_none_or(|d: &DerivedRecord| d.panel.company_id != record.company_id)
            {
                companies += 1;
            }

            let sales_growth = finite_or_zero(sales_growth.get(pos).copied().flatten());
            let employee_growth = finite_or_zero(employee_growth.get(pos).copied().flatten());
            let start_year = record
                .start_year
                .or_else(|| first_year.get(pos).copied().flatten())
                .unwrap_or(record.year);

            let features = DerivedFeatures {
                sales: record.sales.unwrap_or(0.0),
                revenue: record.revenue.unwrap_or(0.0),
                employees: record.employees.unwrap_or(0.0),
                capital: record.capital.unwrap_or(0.0),
                branches: record.branches.unwrap_or(0.0),
                sales_growth,
                employee_growth,
                age: self.age_convention.age(record.year, start_year),
                return_on_capital: ratio(record.revenue, record.capital),
                sales_change_pct: round_decimals(sales_growth * 100.0, 2),
            };
            derived.push(DerivedRecord {
                panel: record,
                features,
            });
        }

        debug!(
            records = derived.len(),
            companies,
            convention = ?self.age_convention,
            "derived features"
        );
        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use peerscore_data::{IsicSection, Sector, SizeTier};
    use rstest::rstest;

    fn record(id: &str, year: i32) -> PanelRecord {
        PanelRecord::new(
            id,
            year,
            Sector::Isic(IsicSection::Manufacturing),
            SizeTier::Small,
        )
    }

    #[test]
    fn test_growth_rates_follow_year_order() {
        // Deliberately out of order
        let panel = vec![
            record("A", 2021).with_sales(150.0).with_employees(12.0),
            record("A", 2020).with_sales(100.0).with_employees(10.0),
            record("A", 2022).with_sales(120.0).with_employees(12.0),
        ];

        let derived = FeatureDeriver::default().derive(panel).unwrap();
        let years: Vec<i32> = derived.iter().map(|d| d.panel.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022]);

        assert_eq!(derived[0].features.sales_growth, 0.0);
        assert_eq!(derived[0].features.employee_growth, 0.0);
        assert_relative_eq!(derived[1].features.sales_growth, 0.5);
        assert_relative_eq!(derived[1].features.employee_growth, 0.2);
        assert_relative_eq!(derived[2].features.sales_growth, -0.2);
        assert_relative_eq!(derived[2].features.sales_change_pct, -20.0);
        assert_eq!(derived[2].features.employee_growth, 0.0);
    }

    #[test]
    fn test_growth_with_zero_or_missing_prior() {
        let panel = vec![
            record("A", 2020).with_sales(0.0),
            record("A", 2021).with_sales(50.0),
            record("A", 2022),
            record("A", 2023).with_sales(80.0),
        ];

        let derived = FeatureDeriver::default().derive(panel).unwrap();
        assert_eq!(derived[1].features.sales_growth, 0.0);
        // Missing current value: undefined, not a total collapse
        assert_eq!(derived[2].features.sales_growth, 0.0);
        assert_eq!(derived[2].features.sales_change_pct, 0.0);
        // Missing prior value: undefined, falls back to 0
        assert_eq!(derived[3].features.sales_growth, 0.0);
        assert!(derived.iter().all(|d| d.features.sales_growth.is_finite()));
    }

    #[rstest]
    #[case(Some(12.0), None)]
    #[case(None, Some(12.0))]
    #[case(None, None)]
    fn test_missing_employee_count_has_no_growth(
        #[case] before: Option<f64>,
        #[case] after: Option<f64>,
    ) {
        let mut first = record("A", 2020).with_sales(100.0);
        first.employees = before;
        let mut second = record("A", 2021);
        second.employees = after;

        let derived = FeatureDeriver::default().derive(vec![first, second]).unwrap();
        assert_eq!(derived[1].features.employee_growth, 0.0);
        // Sales missing in the later year as well
        assert_eq!(derived[1].features.sales_growth, 0.0);
        assert_eq!(derived[1].features.sales_change_pct, 0.0);
    }

    #[test]
    fn test_growth_uses_previous_observed_year() {
        let panel = vec![
            record("A", 2018).with_sales(100.0),
            record("A", 2021).with_sales(200.0),
        ];
        let derived = FeatureDeriver::default().derive(panel).unwrap();
        assert_relative_eq!(derived[1].features.sales_growth, 1.0);
    }

    #[test]
    fn test_companies_do_not_share_history() {
        let panel = vec![
            record("A", 2020).with_sales(100.0),
            record("B", 2021).with_sales(300.0),
        ];
        let derived = FeatureDeriver::default().derive(panel).unwrap();
        assert_eq!(derived[1].features.sales_growth, 0.0);
    }

    #[rstest]
    #[case(AgeConvention::Elapsed, 3)]
    #[case(AgeConvention::Inclusive, 4)]
    fn test_age_from_first_observed_year(#[case] convention: AgeConvention, #[case] age: i32) {
        let panel = vec![record("A", 2022), record("A", 2019)];
        let derived = FeatureDeriver::new(convention).derive(panel).unwrap();
        assert_eq!(derived[1].panel.year, 2022);
        assert_eq!(derived[1].features.age, age);
    }

    #[rstest]
    #[case(AgeConvention::Elapsed, 2019, 1)]
    #[case(AgeConvention::Inclusive, 2019, 1)]
    #[case(AgeConvention::Elapsed, 2010, 9)]
    #[case(AgeConvention::Inclusive, 2010, 10)]
    #[case(AgeConvention::Elapsed, 2025, 1)]
    fn test_age_from_start_year(
        #[case] convention: AgeConvention,
        #[case] start_year: i32,
        #[case] age: i32,
    ) {
        let panel = vec![record("A", 2019).with_start_year(start_year)];
        let derived = FeatureDeriver::new(convention).derive(panel).unwrap();
        assert_eq!(derived[0].features.age, age);
    }

    #[test]
    fn test_return_on_capital() {
        let panel = vec![
            record("A", 2020).with_revenue(50.0).with_capital(200.0),
            record("B", 2020).with_revenue(50.0).with_capital(0.0),
            record("C", 2020).with_revenue(50.0),
        ];
        let derived = FeatureDeriver::default().derive(panel).unwrap();
        assert_relative_eq!(derived[0].features.return_on_capital, 0.25);
        assert_eq!(derived[1].features.return_on_capital, 0.0);
        assert_eq!(derived[2].features.return_on_capital, 0.0);
    }

    #[test]
    fn test_duplicate_company_year_is_rejected() {
        let panel = vec![record("A", 2020), record("B", 2020), record("A", 2020)];
        let err = FeatureDeriver::default().derive(panel).unwrap_err();
        assert!(matches!(
            err,
            FactorError::DuplicateRecord { ref company_id, year: 2020 } if company_id == "A"
        ));
    }

    #[test]
    fn test_empty_company_id_is_rejected() {
        let panel = vec![record(" ", 2020)];
        let err = FeatureDeriver::default().derive(panel).unwrap_err();
        assert!(matches!(err, FactorError::EmptyCompanyId { year: 2020 }));
    }

    #[test]
    fn test_no_record_dropped() {
        let panel: Vec<PanelRecord> = (0..5)
            .flat_map(|c| (2018..2022).map(move |y| record(&format!("C{c}"), y)))
            .collect();
        let derived = FeatureDeriver::default().derive(panel).unwrap();
        assert_eq!(derived.len(), 20);
        assert!(FeatureDeriver::default().derive(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_slot_values() {
        let panel = vec![
            record("A", 2020)
                .with_sales(10.0)
                .with_branches(3.0)
                .with_start_year(2015),
        ];
        let derived = FeatureDeriver::default().derive(panel).unwrap();
        let d = &derived[0];
        assert_eq!(d.value(FeatureSlot::SalesLevel), Some(10.0));
        assert_eq!(d.value(FeatureSlot::Branches), Some(3.0));
        assert_eq!(d.value(FeatureSlot::Age), Some(5.0));
        assert_eq!(d.value(FeatureSlot::SizeTier), Some(0.0));
        assert_eq!(d.value(FeatureSlot::Employees), Some(0.0));
    }
}
