//! Scenario runner for batch evaluations
//!
//! Holds the shared baseline once, then evaluates many independent scenario
//! snapshots. Every evaluation works on its own copy, so they run in parallel.

use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use super::{FieldValue, ScenarioSession, ScenarioState};
use crate::baseline::BaselineConstants;
use crate::error::ValidationResult;
use crate::model::{compute_metrics, operating_profit_at, DerivedMetrics, SensitivitySeries};

/// Operating profit for one efficiency level across the sales axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub efficiency: f64,
    pub operating_profit: Vec<f64>,
}

/// Two-way table: efficiency levels (rows) by external sales (columns)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityGrid {
    pub external_sales: Vec<f64>,
    pub rows: Vec<GridRow>,
}

/// Pre-loaded runner for evaluating many scenarios against one baseline
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
///
/// let edit_sets = vec![
///     vec![FieldValue::Efficiency(0.45)],
///     vec![FieldValue::Efficiency(0.60), FieldValue::Repairs(700.0)],
/// ];
/// let results = runner.run_scenarios(&edit_sets);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    baseline: Arc<BaselineConstants>,
}

impl ScenarioRunner {
    /// Create runner with the built-in FY2025 baseline
    pub fn new() -> Self {
        Self::with_baseline(Arc::new(BaselineConstants::fy2025()))
    }

    /// Create runner with a pre-loaded baseline
    pub fn with_baseline(baseline: Arc<BaselineConstants>) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> &BaselineConstants {
        &self.baseline
    }

    /// Fresh session seeded from the shared baseline
    pub fn session(&self) -> ScenarioSession {
        ScenarioSession::new(Arc::clone(&self.baseline))
    }

    /// Apply edits to a fresh baseline scenario and compute its metrics
    pub fn run(&self, edits: &[FieldValue]) -> ValidationResult<DerivedMetrics> {
        let mut session = self.session();
        session.apply(edits, false)?;
        Ok(session.metrics())
    }

    /// Compute metrics for many snapshots in parallel
    pub fn run_batch(&self, scenarios: &[ScenarioState]) -> Vec<DerivedMetrics> {
        scenarios.par_iter().map(compute_metrics).collect()
    }

    /// Run several edit sets, each from its own fresh baseline scenario
    pub fn run_scenarios(&self, edit_sets: &[Vec<FieldValue>]) -> Vec<ValidationResult<DerivedMetrics>> {
        edit_sets.par_iter().map(|edits| self.run(edits)).collect()
    }

    /// Operating profit for each efficiency level over the scenario's
    /// sensitivity sales points. Every efficiency must be valid.
    pub fn efficiency_grid(
        &self,
        scenario: &ScenarioState,
        efficiencies: &[f64],
    ) -> ValidationResult<SensitivityGrid> {
        let external_sales: Vec<f64> = SensitivitySeries::new(scenario)
            .iter()
            .map(|p| p.external_sales)
            .collect();

        let variants = efficiencies
            .iter()
            .map(|&efficiency| {
                let mut variant = *scenario;
                variant.set(FieldValue::Efficiency(efficiency))?;
                Ok(variant)
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        let rows = variants
            .par_iter()
            .map(|variant| GridRow {
                efficiency: variant.efficiency,
                operating_profit: external_sales
                    .iter()
                    .map(|&sales| operating_profit_at(variant, sales))
                    .collect(),
            })
            .collect();

        log::debug!(
            "Built {}x{} efficiency grid",
            efficiencies.len(),
            external_sales.len()
        );

        Ok(SensitivityGrid { external_sales, rows })
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_run_applies_edits_to_fresh_baseline() {
        let runner = ScenarioRunner::new();
        let base = runner.run(&[]).unwrap();
        let higher = runner.run(&[FieldValue::Efficiency(0.6)]).unwrap();

        // Higher efficiency should result in higher operating profit
        assert!(higher.operating_profit > base.operating_profit);
        // And the first run was not affected by the second
        assert_eq!(runner.run(&[]).unwrap(), base);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let runner = ScenarioRunner::new();
        let scenarios: Vec<ScenarioState> = [0.0, 250.0, 721.5, 1000.0, 2500.0]
            .iter()
            .map(|&sales| ScenarioState {
                external_sales_m: sales,
                ..ScenarioState::default()
            })
            .collect();

        let parallel = runner.run_batch(&scenarios);
        let sequential: Vec<_> = scenarios.iter().map(compute_metrics).collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_run_scenarios_reports_each_result() {
        let runner = ScenarioRunner::new();
        let edit_sets = vec![
            vec![FieldValue::Repairs(700.0)],
            vec![FieldValue::ExtCostPct(1.2)],
            vec![FieldValue::FxAdjustment(-150.0)],
        ];

        let results = runner.run_scenarios(&edit_sets);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ValidationError::OutOfRange { .. })));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_efficiency_grid() {
        let runner = ScenarioRunner::new();
        let scenario = ScenarioState::default();
        let grid = runner
            .efficiency_grid(&scenario, &[0.4, 0.51, 0.7])
            .unwrap();

        assert_eq!(grid.rows.len(), 3);
        assert_eq!(grid.external_sales.len(), SensitivitySeries::new(&scenario).len());
        for row in &grid.rows {
            assert_eq!(row.operating_profit.len(), grid.external_sales.len());
        }

        // The row at the scenario's own efficiency matches the sensitivity series
        let series: Vec<f64> = SensitivitySeries::new(&scenario)
            .iter()
            .map(|p| p.operating_profit)
            .collect();
        for (a, b) in grid.rows[1].operating_profit.iter().zip(&series) {
            assert!((a - b).abs() < 1e-9);
        }

        // Higher efficiency dominates at every sales point
        for i in 0..grid.external_sales.len() {
            assert!(grid.rows[2].operating_profit[i] > grid.rows[0].operating_profit[i]);
        }
    }

    #[test]
    fn test_efficiency_grid_rejects_invalid_level() {
        let runner = ScenarioRunner::new();
        let result = runner.efficiency_grid(&ScenarioState::default(), &[0.5, 0.9]);
        assert!(result.is_err());
    }
}
