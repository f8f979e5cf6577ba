//! Profitability model: pure functions of a scenario snapshot

mod break_even;
mod display;
mod metrics;
mod sensitivity;

pub use break_even::{break_even_external_sales, required_external_sales, BreakEven};
pub use display::DisplayMetrics;
pub use metrics::{
    compute_metrics, ext_base_margin, external_gross_profit, int_base_margin, internal_gross_profit,
    operating_profit_at, overhead_net_of_fx, DerivedMetrics, MONTHS_PER_YEAR,
};
pub use sensitivity::{SensitivityIter, SensitivityPoint, SensitivitySeries};
