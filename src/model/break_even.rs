//! Break-even and target external sales
//!
//! Solves `target = X * ext_margin * efficiency + int_gp - fixed - repairs + fx`
//! for the external sales volume `X`, holding every other input fixed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metrics::{ext_base_margin, internal_gross_profit, overhead_net_of_fx};
use crate::currency::{self, Currency};
use crate::error::CurrencyError;
use crate::scenario::ScenarioState;

/// External sales needed to reach a profit level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BreakEven {
    /// Monthly external sales, never negative
    Finite(f64),
    /// External sales contribute no margin, so no volume reaches the target
    Unreachable,
}

impl BreakEven {
    /// Numeric rendering; `Unreachable` becomes `+inf`
    pub fn as_f64(&self) -> f64 {
        match self {
            BreakEven::Finite(v) => *v,
            BreakEven::Unreachable => f64::INFINITY,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            BreakEven::Finite(v) => Some(*v),
            BreakEven::Unreachable => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, BreakEven::Finite(_))
    }

    /// Convert a finite value into the display unit; `Unreachable` passes through
    pub fn to_display(&self, currency: Currency, rate: f64) -> Result<Self, CurrencyError> {
        match self {
            BreakEven::Finite(v) => Ok(BreakEven::Finite(currency::to_display(*v, currency, rate)?)),
            BreakEven::Unreachable => {
                currency::check_rate(rate)?;
                Ok(BreakEven::Unreachable)
            }
        }
    }
}

impl fmt::Display for BreakEven {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakEven::Finite(v) => write!(f, "{:.0}", v),
            BreakEven::Unreachable => f.write_str("unreachable"),
        }
    }
}

/// Monthly external sales at which operating profit equals `target_operating_profit_m`.
///
/// Clamped at zero: a negative answer means the target is already met with no
/// external sales at all. A non-finite target is treated as unreachable.
pub fn required_external_sales(scenario: &ScenarioState, target_operating_profit_m: f64) -> BreakEven {
    let denominator = ext_base_margin(scenario) * scenario.efficiency;
    if denominator <= 0.0 || !target_operating_profit_m.is_finite() {
        return BreakEven::Unreachable;
    }

    let shortfall =
        overhead_net_of_fx(scenario) - internal_gross_profit(scenario) + target_operating_profit_m;
    BreakEven::Finite((shortfall / denominator).max(0.0))
}

/// Monthly external sales at which operating profit is exactly zero
pub fn break_even_external_sales(scenario: &ScenarioState) -> BreakEven {
    required_external_sales(scenario, 0.0)
}
