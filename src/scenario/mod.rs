//! Scenario state, field edits and the per-session state manager

mod field;
mod runner;
mod state;

pub use field::{Domain, Field, FieldValue};
pub use runner::{GridRow, ScenarioRunner, SensitivityGrid};
pub use state::ScenarioState;

use std::sync::Arc;

use crate::baseline::BaselineConstants;
use crate::error::ValidationResult;
use crate::model::{compute_metrics, DerivedMetrics, DisplayMetrics};

/// Owns the scenario of one user session.
///
/// The state starts empty and is seeded from the baseline on first use.
/// Edits that fail validation are rejected and leave the previous value in
/// place. Sessions never share state; only the baseline is shared.
#[derive(Debug, Clone)]
pub struct ScenarioSession {
    baseline: Arc<BaselineConstants>,
    state: Option<ScenarioState>,
}

impl ScenarioSession {
    pub fn new(baseline: Arc<BaselineConstants>) -> Self {
        Self {
            baseline,
            state: None,
        }
    }

    pub fn baseline(&self) -> &BaselineConstants {
        &self.baseline
    }

    /// Whether the state has been seeded yet
    pub fn is_seeded(&self) -> bool {
        self.state.is_some()
    }

    /// Replace the whole state with baseline values
    pub fn reset(&mut self) {
        self.state = Some(ScenarioState::from_baseline(&self.baseline));
        log::debug!("Scenario reset to baseline '{}'", self.baseline.label);
    }

    fn state_mut(&mut self) -> &mut ScenarioState {
        let baseline = &self.baseline;
        self.state.get_or_insert_with(|| {
            log::debug!("Scenario seeded from baseline '{}'", baseline.label);
            ScenarioState::from_baseline(baseline)
        })
    }

    /// Snapshot of the current inputs
    pub fn get_scenario(&mut self) -> ScenarioState {
        *self.state_mut()
    }

    pub fn get(&mut self, field: Field) -> FieldValue {
        self.state_mut().get(field)
    }

    /// Validate and apply an edit given in native units
    pub fn set_field(&mut self, value: FieldValue) -> ValidationResult<()> {
        let state = self.state_mut();
        match state.set(value) {
            Ok(()) => {
                log::debug!("Accepted {}", value);
                Ok(())
            }
            Err(e) => {
                log::warn!("Rejected {}: {}", value, e);
                Err(e)
            }
        }
    }

    /// Apply an edit whose amount is in the current display unit. Money fields
    /// are converted to native first; other fields are applied unchanged.
    pub fn set_field_display(&mut self, value: FieldValue) -> ValidationResult<()> {
        let native = match value.number() {
            Some(amount) if value.field().is_monetary() => {
                let state = self.state_mut();
                value.with_number(state.to_native(amount)?)
            }
            _ => value,
        };
        self.set_field(native)
    }

    /// Apply edits in order, stopping at the first rejection. Edits before the
    /// rejected one stay applied.
    pub fn apply(&mut self, edits: &[FieldValue], display_units: bool) -> ValidationResult<()> {
        for edit in edits {
            if display_units {
                self.set_field_display(*edit)?;
            } else {
                self.set_field(*edit)?;
            }
        }
        Ok(())
    }

    /// Metrics for the current inputs, in native units
    pub fn metrics(&mut self) -> DerivedMetrics {
        compute_metrics(self.state_mut())
    }

    /// Metrics for the current inputs, in the selected display unit
    pub fn display_metrics(&mut self) -> ValidationResult<DisplayMetrics> {
        let scenario = self.get_scenario();
        let metrics = compute_metrics(&scenario);
        Ok(DisplayMetrics::from_metrics(&metrics, &scenario)?)
    }

    /// Convert a native amount for display using the session's selector and rate
    pub fn to_display(&mut self, amount_native: f64) -> ValidationResult<f64> {
        Ok(self.state_mut().to_display(amount_native)?)
    }

    /// Convert a display amount into native units
    pub fn to_native(&mut self, amount_display: f64) -> ValidationResult<f64> {
        Ok(self.state_mut().to_native(amount_display)?)
    }
}

impl Default for ScenarioSession {
    fn default() -> Self {
        Self::new(Arc::new(BaselineConstants::fy2025()))
    }
}
