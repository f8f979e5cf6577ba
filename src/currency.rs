//! Currency boundary between the model's native unit and the display unit
//!
//! Scenario state is always stored in native units. These transforms are only
//! applied when values cross into or out of the presentation layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CurrencyError;

/// Which unit amounts are shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// The unit scenario state is stored in (AUD'000 for the FY2025 baseline)
    Native,
    /// Native amounts scaled by the exchange rate (THB'000)
    Foreign,
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Native
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Native => f.write_str("native"),
            Currency::Foreign => f.write_str("foreign"),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Currency::Native),
            "foreign" => Ok(Currency::Foreign),
            other => Err(format!("Unknown currency selector: {}", other)),
        }
    }
}

/// Reject zero, negative and non-finite exchange rates
pub fn check_rate(rate: f64) -> Result<f64, CurrencyError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(CurrencyError::InvalidRate(rate))
    }
}

/// Convert a native amount into the display unit.
///
/// `rate` is foreign units per one native unit. The rate is checked even when
/// `currency` is `Native` so that a bad rate never slips through unnoticed.
pub fn to_display(amount_native: f64, currency: Currency, rate: f64) -> Result<f64, CurrencyError> {
    let rate = check_rate(rate)?;
    Ok(match currency {
        Currency::Native => amount_native,
        Currency::Foreign => amount_native * rate,
    })
}

/// Convert a display-unit amount back into native units (inverse of [`to_display`])
pub fn to_native(amount_display: f64, currency: Currency, rate: f64) -> Result<f64, CurrencyError> {
    let rate = check_rate(rate)?;
    Ok(match currency {
        Currency::Native => amount_display,
        Currency::Foreign => amount_display / rate,
    })
}
