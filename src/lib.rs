//! Profit Levers - scenario model for a manufacturing business unit
//!
//! This library provides:
//! - A baseline registry seeded from the FY2025 annual report (overridable from CSV)
//! - Per-session scenario state with validated edits and reset-to-baseline
//! - Gross profit, operating profit, annualized totals and break-even sales
//! - A lazy profit-vs-volume sensitivity series and parallel batch evaluation
//! - Native/display currency conversion at the presentation boundary

pub mod baseline;
pub mod currency;
pub mod error;
pub mod model;
pub mod scenario;

// Re-export commonly used types
pub use baseline::{BaselineConstants, ReportPeriod};
pub use currency::{to_display, to_native, Currency};
pub use error::{BaselineError, CurrencyError, ValidationError};
pub use model::{
    compute_metrics, required_external_sales, BreakEven, DerivedMetrics, DisplayMetrics,
    SensitivityPoint, SensitivitySeries,
};
pub use scenario::{Field, FieldValue, ScenarioRunner, ScenarioSession, ScenarioState};
