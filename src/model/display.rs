//! Metrics rendered in the scenario's display unit

use serde::Serialize;

use super::break_even::BreakEven;
use super::metrics::DerivedMetrics;
use super::sensitivity::SensitivityPoint;
use crate::currency::Currency;
use crate::error::CurrencyError;
use crate::scenario::ScenarioState;

/// Money metrics converted for display. Margins are unitless and copied as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayMetrics {
    pub currency: Currency,
    pub exchange_rate: f64,
    pub ext_base_margin: f64,
    pub int_base_margin: f64,
    pub ext_gp: f64,
    pub int_gp: f64,
    pub total_gp: f64,
    pub operating_profit: f64,
    pub total_sales: f64,
    pub annual_sales: f64,
    pub annual_operating_profit: f64,
    pub break_even: BreakEven,
    pub sensitivity: Vec<SensitivityPoint>,
}

impl DisplayMetrics {
    /// Convert native metrics using the scenario's currency selector and rate
    pub fn from_metrics(metrics: &DerivedMetrics, scenario: &ScenarioState) -> Result<Self, CurrencyError> {
        let shown = |amount: f64| scenario.to_display(amount);

        Ok(Self {
            currency: scenario.currency,
            exchange_rate: scenario.exchange_rate,
            ext_base_margin: metrics.ext_base_margin,
            int_base_margin: metrics.int_base_margin,
            ext_gp: shown(metrics.ext_gp)?,
            int_gp: shown(metrics.int_gp)?,
            total_gp: shown(metrics.total_gp)?,
            operating_profit: shown(metrics.operating_profit)?,
            total_sales: shown(metrics.total_sales)?,
            annual_sales: shown(metrics.annual_sales)?,
            annual_operating_profit: shown(metrics.annual_operating_profit)?,
            break_even: metrics.break_even.to_display(scenario.currency, scenario.exchange_rate)?,
            sensitivity: metrics
                .sensitivity
                .to_display(scenario.currency, scenario.exchange_rate)?,
        })
    }
}
