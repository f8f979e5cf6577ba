//! Gross profit, operating profit and annualized totals

use serde::Serialize;

use super::break_even::{break_even_external_sales, BreakEven};
use super::sensitivity::SensitivitySeries;
use crate::scenario::ScenarioState;

/// Months used to annualize monthly figures
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Metrics derived from one scenario snapshot. Never stored; recompute on read.
///
/// Money amounts are monthly native units unless prefixed `annual_`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
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
    pub sensitivity: SensitivitySeries,
}

/// Share of external sales left after product cost, floored at zero
pub fn ext_base_margin(scenario: &ScenarioState) -> f64 {
    (1.0 - scenario.ext_cost_pct).max(0.0)
}

/// Share of internal sales left after product cost, floored at zero
pub fn int_base_margin(scenario: &ScenarioState) -> f64 {
    (1.0 - scenario.int_cost_pct).max(0.0)
}

/// External gross profit for a given external sales volume
pub fn external_gross_profit(scenario: &ScenarioState, external_sales_m: f64) -> f64 {
    external_sales_m * ext_base_margin(scenario) * scenario.efficiency
}

pub fn internal_gross_profit(scenario: &ScenarioState) -> f64 {
    scenario.internal_sales_m * int_base_margin(scenario) * scenario.efficiency
}

/// Costs and one-offs that sit below gross profit: fixed + repairs - FX gain
pub fn overhead_net_of_fx(scenario: &ScenarioState) -> f64 {
    scenario.fixed_costs_m + scenario.repairs_m - scenario.fx_adjustment_m
}

/// Operating profit with external sales replaced by `external_sales_m`,
/// everything else held at the scenario's values
pub fn operating_profit_at(scenario: &ScenarioState, external_sales_m: f64) -> f64 {
    external_gross_profit(scenario, external_sales_m) + internal_gross_profit(scenario)
        - overhead_net_of_fx(scenario)
}

/// Compute every derived metric from a scenario snapshot
pub fn compute_metrics(scenario: &ScenarioState) -> DerivedMetrics {
    let ext_gp = external_gross_profit(scenario, scenario.external_sales_m);
    let int_gp = internal_gross_profit(scenario);
    let total_gp = ext_gp + int_gp;
    let operating_profit =
        total_gp - scenario.fixed_costs_m - scenario.repairs_m + scenario.fx_adjustment_m;
    let total_sales = scenario.external_sales_m + scenario.internal_sales_m;

    DerivedMetrics {
        ext_base_margin: ext_base_margin(scenario),
        int_base_margin: int_base_margin(scenario),
        ext_gp,
        int_gp,
        total_gp,
        operating_profit,
        total_sales,
        annual_sales: total_sales * MONTHS_PER_YEAR,
        annual_operating_profit: operating_profit * MONTHS_PER_YEAR,
        break_even: break_even_external_sales(scenario),
        sensitivity: SensitivitySeries::new(scenario),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_baseline_figures() {
        let metrics = compute_metrics(&ScenarioState::default());

        assert_abs_diff_eq!(metrics.ext_base_margin, 0.20, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.int_base_margin, 0.50, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.ext_gp, 73.593, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.int_gp, 175.206_25, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.total_gp, 248.799_25, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.operating_profit, -59.700_75, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.total_sales, (8658.0 + 8245.0) / 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.annual_sales, 16_903.0, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.annual_operating_profit, -716.409, epsilon = 1e-9);
    }

    #[test]
    fn test_fx_and_repairs_flow_through() {
        let scenario = ScenarioState {
            repairs_m: 700.0,
            fx_adjustment_m: -150.0,
            ..ScenarioState::default()
        };
        let base = compute_metrics(&ScenarioState::default());
        let metrics = compute_metrics(&scenario);

        assert_abs_diff_eq!(metrics.total_gp, base.total_gp, epsilon = 1e-12);
        assert_abs_diff_eq!(
            metrics.operating_profit,
            base.operating_profit - 850.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_operating_profit_at_current_sales_matches() {
        let scenario = ScenarioState {
            fx_adjustment_m: 42.0,
            ..ScenarioState::default()
        };
        let metrics = compute_metrics(&scenario);
        assert_abs_diff_eq!(
            operating_profit_at(&scenario, scenario.external_sales_m),
            metrics.operating_profit,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_zero_margin_floors() {
        let scenario = ScenarioState {
            ext_cost_pct: 1.0,
            int_cost_pct: 1.0,
            ..ScenarioState::default()
        };
        let metrics = compute_metrics(&scenario);

        assert_eq!(metrics.ext_gp, 0.0);
        assert_eq!(metrics.int_gp, 0.0);
        assert_abs_diff_eq!(metrics.operating_profit, -308.5, epsilon = 1e-9);
    }

    fn op(scenario: ScenarioState) -> f64 {
        compute_metrics(&scenario).operating_profit
    }

    #[test]
    fn test_monotonicity() {
        let base = ScenarioState::default();
        let levels = [0.0, 100.0, 500.0, 721.5, 1500.0, 5000.0];

        for pair in levels.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);

            assert!(op(ScenarioState { external_sales_m: lo, ..base })
                <= op(ScenarioState { external_sales_m: hi, ..base }));
            assert!(op(ScenarioState { internal_sales_m: lo, ..base })
                <= op(ScenarioState { internal_sales_m: hi, ..base }));
            assert!(op(ScenarioState { fixed_costs_m: lo, ..base })
                >= op(ScenarioState { fixed_costs_m: hi, ..base }));
            assert!(op(ScenarioState { repairs_m: lo, ..base })
                >= op(ScenarioState { repairs_m: hi, ..base }));
        }

        let efficiencies = [0.30, 0.40, 0.51, 0.65, 0.80];
        for pair in efficiencies.windows(2) {
            assert!(op(ScenarioState { efficiency: pair[0], ..base })
                <= op(ScenarioState { efficiency: pair[1], ..base }));
        }
    }
}
