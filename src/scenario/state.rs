//! Scenario state: the current set of user-adjustable inputs

use serde::{Deserialize, Serialize};

use super::field::{Domain, Field, FieldValue};
use crate::baseline::BaselineConstants;
use crate::currency::{self, Currency};
use crate::error::{CurrencyError, ValidationResult};

/// Snapshot of every scenario input.
///
/// All money amounts are monthly and in native units. The display currency
/// only affects values at the boundary, never what is stored here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioState {
    /// Display currency selector
    pub currency: Currency,

    /// Foreign units per one native unit
    pub exchange_rate: f64,

    /// External sales per month
    pub external_sales_m: f64,

    /// Internal sales per month
    pub internal_sales_m: f64,

    /// Fraction of external sales consumed by product cost
    pub ext_cost_pct: f64,

    /// Fraction of internal sales consumed by product cost
    pub int_cost_pct: f64,

    /// Realized-margin multiplier
    pub efficiency: f64,

    /// Fixed costs per month
    pub fixed_costs_m: f64,

    /// Extra repairs and maintenance per month
    pub repairs_m: f64,

    /// FX / exceptional items per month (positive = gain)
    pub fx_adjustment_m: f64,

    /// Baseline monthly external sales captured at seeding time. Not editable;
    /// it centers the sensitivity series when external sales are zero.
    pub baseline_external_sales_m: f64,
}

impl ScenarioState {
    /// Seed every field from the baseline
    pub fn from_baseline(baseline: &BaselineConstants) -> Self {
        Self {
            currency: baseline.currency,
            exchange_rate: baseline.exchange_rate,
            external_sales_m: baseline.external_sales_m(),
            internal_sales_m: baseline.internal_sales_m(),
            ext_cost_pct: baseline.ext_cost_pct,
            int_cost_pct: baseline.int_cost_pct,
            efficiency: baseline.efficiency,
            fixed_costs_m: baseline.fixed_costs_m(),
            repairs_m: baseline.repairs_m,
            fx_adjustment_m: baseline.fx_adjustment_m,
            baseline_external_sales_m: baseline.external_sales_m(),
        }
    }

    /// Current value of a field
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::ExternalSales => FieldValue::ExternalSales(self.external_sales_m),
            Field::InternalSales => FieldValue::InternalSales(self.internal_sales_m),
            Field::ExtCostPct => FieldValue::ExtCostPct(self.ext_cost_pct),
            Field::IntCostPct => FieldValue::IntCostPct(self.int_cost_pct),
            Field::Efficiency => FieldValue::Efficiency(self.efficiency),
            Field::FixedCosts => FieldValue::FixedCosts(self.fixed_costs_m),
            Field::Repairs => FieldValue::Repairs(self.repairs_m),
            Field::FxAdjustment => FieldValue::FxAdjustment(self.fx_adjustment_m),
            Field::ExchangeRate => FieldValue::ExchangeRate(self.exchange_rate),
            Field::Currency => FieldValue::Currency(self.currency),
        }
    }

    /// Validate and store a value. On error nothing is changed.
    pub fn set(&mut self, value: FieldValue) -> ValidationResult<()> {
        value.check()?;

        match value {
            FieldValue::ExternalSales(v) => self.external_sales_m = v,
            FieldValue::InternalSales(v) => self.internal_sales_m = v,
            FieldValue::ExtCostPct(v) => self.ext_cost_pct = v,
            FieldValue::IntCostPct(v) => self.int_cost_pct = v,
            FieldValue::Efficiency(v) => self.efficiency = v,
            FieldValue::FixedCosts(v) => self.fixed_costs_m = v,
            FieldValue::Repairs(v) => self.repairs_m = v,
            FieldValue::FxAdjustment(v) => self.fx_adjustment_m = v,
            FieldValue::ExchangeRate(v) => self.exchange_rate = v,
            FieldValue::Currency(c) => self.currency = c,
        }
        Ok(())
    }

    /// Check every field against its domain
    pub fn validate(&self) -> ValidationResult<()> {
        for field in Field::ALL {
            self.get(field).check()?;
        }
        Domain::NON_NEGATIVE.check("baseline_external_sales_m", self.baseline_external_sales_m)?;
        Ok(())
    }

    /// Convert a native amount into the selected display unit
    pub fn to_display(&self, amount_native: f64) -> Result<f64, CurrencyError> {
        currency::to_display(amount_native, self.currency, self.exchange_rate)
    }

    /// Convert a display-unit amount into native units
    pub fn to_native(&self, amount_display: f64) -> Result<f64, CurrencyError> {
        currency::to_native(amount_display, self.currency, self.exchange_rate)
    }
}

impl Default for ScenarioState {
    fn default() -> Self {
        Self::from_baseline(&BaselineConstants::fy2025())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use approx::assert_relative_eq;

    #[test]
    fn test_seeded_from_baseline() {
        let state = ScenarioState::default();

        assert_eq!(state.currency, Currency::Native);
        assert_eq!(state.exchange_rate, 24.0);
        assert_relative_eq!(state.external_sales_m, 721.5);
        assert_relative_eq!(state.internal_sales_m, 687.083_333_333, epsilon = 1e-6);
        assert_relative_eq!(state.fixed_costs_m, 308.5);
        assert_eq!(state.efficiency, 0.51);
        assert_eq!(state.repairs_m, 0.0);
        assert_eq!(state.fx_adjustment_m, 0.0);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_rejected_edit_keeps_previous_value() {
        let mut state = ScenarioState::default();

        let err = state.set(FieldValue::Efficiency(0.95)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "efficiency", .. }));
        assert_eq!(state.efficiency, 0.51);

        assert!(state.set(FieldValue::ExtCostPct(1.5)).is_err());
        assert_eq!(state.ext_cost_pct, 0.80);

        assert!(state.set(FieldValue::ExternalSales(-10.0)).is_err());
        assert_relative_eq!(state.external_sales_m, 721.5);

        assert!(state.set(FieldValue::ExchangeRate(5.0)).is_err());
        assert_eq!(state.exchange_rate, 24.0);
    }

    #[test]
    fn test_accepted_edits() {
        let mut state = ScenarioState::default();

        state.set(FieldValue::Repairs(700.0)).unwrap();
        state.set(FieldValue::FxAdjustment(-75.0)).unwrap();
        state.set(FieldValue::Currency(Currency::Foreign)).unwrap();

        assert_eq!(state.get(Field::Repairs), FieldValue::Repairs(700.0));
        assert_eq!(state.get(Field::FxAdjustment), FieldValue::FxAdjustment(-75.0));
        assert_eq!(state.get(Field::Currency), FieldValue::Currency(Currency::Foreign));
    }

    #[test]
    fn test_display_does_not_touch_storage() {
        let mut state = ScenarioState::default();
        state.set(FieldValue::Currency(Currency::Foreign)).unwrap();

        assert_relative_eq!(state.to_display(state.fixed_costs_m).unwrap(), 308.5 * 24.0);
        assert_relative_eq!(state.fixed_costs_m, 308.5);
        assert_relative_eq!(state.to_native(7404.0).unwrap(), 308.5);
    }
}
