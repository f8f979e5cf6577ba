//! Baseline registry seeded from the FY2025 annual report
//!
//! The report states annual totals; the scenario works in monthly figures,
//! so every total is divided by the number of months in the report period.

pub mod loader;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::currency::Currency;
use crate::error::{BaselineError, ValidationError};
use crate::scenario::ScenarioState;

pub use loader::DEFAULT_BASELINE_PATH;

/// Inclusive date range covered by the source report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportPeriod {
    /// Create a period, rejecting an inverted range
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BaselineError> {
        if end < start {
            return Err(BaselineError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// July 2024 through June 2025
    pub fn fy2025() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 7, 1).expect("static date"),
            end: NaiveDate::from_ymd_opt(2025, 6, 30).expect("static date"),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar months touched by the period (12 for a fiscal year)
    pub fn months(&self) -> u32 {
        let years = (self.end.year() - self.start.year()) as u32;
        years * 12 + self.end.month() + 1 - self.start.month()
    }
}

/// Immutable baseline constants.
///
/// Sales and fixed costs are report-period totals in native units
/// (thousands). Repairs and FX are already monthly. Rates are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineConstants {
    /// Name of the source report
    pub label: String,

    /// Period the totals cover
    pub period: ReportPeriod,

    /// External (third-party) sales for the period
    pub external_sales: f64,

    /// Internal (intra-group) sales for the period
    pub internal_sales: f64,

    /// SG&A plus fixed factory overheads for the period
    pub fixed_costs: f64,

    /// Operating profit reported for the period, kept for reference only
    pub operating_profit_outlook: f64,

    /// Default realized-margin multiplier
    pub efficiency: f64,

    /// Default fraction of external sales consumed by product cost
    pub ext_cost_pct: f64,

    /// Default fraction of internal sales consumed by product cost
    pub int_cost_pct: f64,

    /// Default extra repairs per month
    pub repairs_m: f64,

    /// Default FX / exceptional adjustment per month (positive = gain)
    pub fx_adjustment_m: f64,

    /// Default foreign units per native unit
    pub exchange_rate: f64,

    /// Default display currency
    pub currency: Currency,

    /// Label for native amounts
    pub native_unit: String,

    /// Label for foreign amounts
    pub foreign_unit: String,
}

impl BaselineConstants {
    /// FY2025 Outlook figures from the June 2025 board report
    pub fn fy2025() -> Self {
        Self {
            label: "FY2025 Outlook".to_string(),
            period: ReportPeriod::fy2025(),
            external_sales: 8658.0,
            internal_sales: 8245.0,
            fixed_costs: 3702.0,
            operating_profit_outlook: -1405.0,
            efficiency: 0.51,
            ext_cost_pct: 0.80,
            int_cost_pct: 0.50,
            repairs_m: 0.0,
            fx_adjustment_m: 0.0,
            exchange_rate: 24.0,
            currency: Currency::Native,
            native_unit: "AUD'000".to_string(),
            foreign_unit: "THB'000".to_string(),
        }
    }

    /// Load overrides from the default location (data/baseline.csv)
    pub fn from_csv() -> Result<Self, BaselineError> {
        Self::from_csv_path(Path::new(DEFAULT_BASELINE_PATH))
    }

    /// Load overrides from a specific CSV file on top of the FY2025 defaults
    pub fn from_csv_path(path: &Path) -> Result<Self, BaselineError> {
        loader::load_baseline(path)
    }

    fn per_month(&self, total: f64) -> f64 {
        total / self.period.months() as f64
    }

    pub fn external_sales_m(&self) -> f64 {
        self.per_month(self.external_sales)
    }

    pub fn internal_sales_m(&self) -> f64 {
        self.per_month(self.internal_sales)
    }

    pub fn fixed_costs_m(&self) -> f64 {
        self.per_month(self.fixed_costs)
    }

    pub fn operating_profit_outlook_m(&self) -> f64 {
        self.per_month(self.operating_profit_outlook)
    }

    /// Display label for a currency selector
    pub fn unit_label(&self, currency: Currency) -> &str {
        match currency {
            Currency::Native => &self.native_unit,
            Currency::Foreign => &self.foreign_unit,
        }
    }

    /// Check that seeding a scenario from these constants would pass every
    /// field constraint
    pub fn validate(&self) -> Result<(), ValidationError> {
        ScenarioState::from_baseline(self).validate()
    }
}

impl Default for BaselineConstants {
    fn default() -> Self {
        Self::fy2025()
    }
}
