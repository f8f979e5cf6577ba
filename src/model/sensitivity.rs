//! Operating profit over a range of external sales volumes
//!
//! The series is described by a handful of numbers and evaluated lazily, so it
//! can be iterated any number of times and always yields the same points.

use serde::ser::{Serialize, Serializer};
use serde::Deserialize;

use super::metrics::{ext_base_margin, internal_gross_profit, overhead_net_of_fx};
use crate::currency::Currency;
use crate::error::CurrencyError;
use crate::scenario::ScenarioState;

/// Lowest sales point as a multiple of the center
pub const RANGE_LOW: f64 = 0.5;
/// Highest sales point as a multiple of the center
pub const RANGE_HIGH: f64 = 1.8;
/// Step as a fraction of the center, before rounding
pub const STEP_FRACTION: f64 = 0.10;
/// Smallest step in native units
pub const MIN_STEP: f64 = 20.0;

/// One point of the profit-vs-volume curve
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub external_sales: f64,
    pub operating_profit: f64,
}

/// Finite, restartable series of (external sales, operating profit) points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivitySeries {
    center: f64,
    start: f64,
    step: f64,
    len: usize,
    /// Operating profit gained per unit of external sales
    slope: f64,
    /// Operating profit at zero external sales
    intercept: f64,
}

impl SensitivitySeries {
    /// Build the series around the scenario's external sales, or around the
    /// baseline monthly external sales when those are zero
    pub fn new(scenario: &ScenarioState) -> Self {
        let center = if scenario.external_sales_m > 0.0 {
            scenario.external_sales_m
        } else {
            scenario.baseline_external_sales_m
        };
        Self::centered_on(scenario, center)
    }

    /// Build the series around an explicit center
    pub fn centered_on(scenario: &ScenarioState, center: f64) -> Self {
        let center = center.max(0.0);
        let start = center * RANGE_LOW;
        let end = center * RANGE_HIGH;
        let step = (center * STEP_FRACTION).round().max(MIN_STEP);

        let mut len = ((end - start) / step).floor() as usize + 1;
        while len > 1 && start + (len - 1) as f64 * step > end {
            len -= 1;
        }

        Self {
            center,
            start,
            step,
            len,
            slope: ext_base_margin(scenario) * scenario.efficiency,
            intercept: internal_gross_profit(scenario) - overhead_net_of_fx(scenario),
        }
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Lowest and highest allowed sales values
    pub fn bounds(&self) -> (f64, f64) {
        (self.center * RANGE_LOW, self.center * RANGE_HIGH)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Point `index`, if inside the series
    pub fn get(&self, index: usize) -> Option<SensitivityPoint> {
        if index >= self.len {
            return None;
        }
        let external_sales = self.start + index as f64 * self.step;
        Some(SensitivityPoint {
            external_sales,
            operating_profit: external_sales * self.slope + self.intercept,
        })
    }

    /// Iterate from the first point. Each call starts over.
    pub fn iter(&self) -> SensitivityIter {
        SensitivityIter {
            series: *self,
            next: 0,
        }
    }

    /// All points converted into the display unit
    pub fn to_display(&self, currency: Currency, rate: f64) -> Result<Vec<SensitivityPoint>, CurrencyError> {
        self.iter()
            .map(|p| {
                Ok(SensitivityPoint {
                    external_sales: crate::currency::to_display(p.external_sales, currency, rate)?,
                    operating_profit: crate::currency::to_display(p.operating_profit, currency, rate)?,
                })
            })
            .collect()
    }
}

/// Iterator over a [`SensitivitySeries`]
#[derive(Debug, Clone)]
pub struct SensitivityIter {
    series: SensitivitySeries,
    next: usize,
}

impl Iterator for SensitivityIter {
    type Item = SensitivityPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let point = self.series.get(self.next)?;
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.series.len.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SensitivityIter {}

impl<'a> IntoIterator for &'a SensitivitySeries {
    type Item = SensitivityPoint;
    type IntoIter = SensitivityIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for SensitivitySeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
