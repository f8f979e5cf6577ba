//! Scenario field names, domains and tagged values

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::currency::Currency;
use crate::error::{ValidationError, ValidationResult};

/// Inclusive numeric domain of a scenario field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub const NON_NEGATIVE: Domain = Domain { min: 0.0, max: f64::INFINITY };
    pub const FRACTION: Domain = Domain { min: 0.0, max: 1.0 };
    pub const EFFICIENCY: Domain = Domain { min: 0.30, max: 0.80 };
    pub const EXCHANGE_RATE: Domain = Domain { min: 10.0, max: 50.0 };
    pub const SIGNED: Domain = Domain { min: f64::NEG_INFINITY, max: f64::INFINITY };

    /// Accept `value` if it is finite and inside the domain
    pub fn check(&self, field: &'static str, value: f64) -> ValidationResult<f64> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        if value < self.min || value > self.max {
            return Err(ValidationError::OutOfRange {
                field,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }
}

/// Editable scenario fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ExternalSales,
    InternalSales,
    ExtCostPct,
    IntCostPct,
    Efficiency,
    FixedCosts,
    Repairs,
    FxAdjustment,
    ExchangeRate,
    Currency,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::ExternalSales,
        Field::InternalSales,
        Field::ExtCostPct,
        Field::IntCostPct,
        Field::Efficiency,
        Field::FixedCosts,
        Field::Repairs,
        Field::FxAdjustment,
        Field::ExchangeRate,
        Field::Currency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::ExternalSales => "external_sales_m",
            Field::InternalSales => "internal_sales_m",
            Field::ExtCostPct => "ext_cost_pct",
            Field::IntCostPct => "int_cost_pct",
            Field::Efficiency => "efficiency",
            Field::FixedCosts => "fixed_costs_m",
            Field::Repairs => "repairs_m",
            Field::FxAdjustment => "fx_adjustment_m",
            Field::ExchangeRate => "exchange_rate",
            Field::Currency => "currency",
        }
    }

    /// Numeric domain, or None for the currency selector
    pub fn domain(&self) -> Option<Domain> {
        match self {
            Field::ExternalSales | Field::InternalSales | Field::FixedCosts | Field::Repairs => {
                Some(Domain::NON_NEGATIVE)
            }
            Field::ExtCostPct | Field::IntCostPct => Some(Domain::FRACTION),
            Field::Efficiency => Some(Domain::EFFICIENCY),
            Field::FxAdjustment => Some(Domain::SIGNED),
            Field::ExchangeRate => Some(Domain::EXCHANGE_RATE),
            Field::Currency => None,
        }
    }

    /// Whether the field holds a money amount (and so is subject to unit conversion)
    pub fn is_monetary(&self) -> bool {
        matches!(
            self,
            Field::ExternalSales
                | Field::InternalSales
                | Field::FixedCosts
                | Field::Repairs
                | Field::FxAdjustment
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == name)
            .ok_or_else(|| ValidationError::UnknownField(name.to_string()))
    }
}

/// A field together with a value, used both to read and to edit a scenario.
///
/// Serialized as `{"field": "efficiency", "value": 0.6}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value")]
pub enum FieldValue {
    #[serde(rename = "external_sales_m")]
    ExternalSales(f64),
    #[serde(rename = "internal_sales_m")]
    InternalSales(f64),
    #[serde(rename = "ext_cost_pct")]
    ExtCostPct(f64),
    #[serde(rename = "int_cost_pct")]
    IntCostPct(f64),
    #[serde(rename = "efficiency")]
    Efficiency(f64),
    #[serde(rename = "fixed_costs_m")]
    FixedCosts(f64),
    #[serde(rename = "repairs_m")]
    Repairs(f64),
    #[serde(rename = "fx_adjustment_m")]
    FxAdjustment(f64),
    #[serde(rename = "exchange_rate")]
    ExchangeRate(f64),
    #[serde(rename = "currency")]
    Currency(Currency),
}

impl FieldValue {
    /// Build a value from a field name and its textual value
    pub fn parse(name: &str, value: &str) -> ValidationResult<Self> {
        let field: Field = name.parse()?;
        let value = value.trim();

        if field == Field::Currency {
            let currency: Currency = value.parse().map_err(|reason| ValidationError::InvalidValue {
                field: field.name().to_string(),
                reason,
            })?;
            return Ok(FieldValue::Currency(currency));
        }

        let number = value.parse::<f64>().map_err(|e| ValidationError::InvalidValue {
            field: field.name().to_string(),
            reason: e.to_string(),
        })?;
        Self::numeric(field, number).ok_or_else(|| ValidationError::InvalidValue {
            field: field.name().to_string(),
            reason: "expected a currency".to_string(),
        })
    }

    /// Value for a numeric field; `None` for the currency selector
    pub(crate) fn numeric(field: Field, value: f64) -> Option<Self> {
        let value = match field {
            Field::ExternalSales => FieldValue::ExternalSales(value),
            Field::InternalSales => FieldValue::InternalSales(value),
            Field::ExtCostPct => FieldValue::ExtCostPct(value),
            Field::IntCostPct => FieldValue::IntCostPct(value),
            Field::Efficiency => FieldValue::Efficiency(value),
            Field::FixedCosts => FieldValue::FixedCosts(value),
            Field::Repairs => FieldValue::Repairs(value),
            Field::FxAdjustment => FieldValue::FxAdjustment(value),
            Field::ExchangeRate => FieldValue::ExchangeRate(value),
            Field::Currency => return None,
        };
        Some(value)
    }

    pub fn field(&self) -> Field {
        match self {
            FieldValue::ExternalSales(_) => Field::ExternalSales,
            FieldValue::InternalSales(_) => Field::InternalSales,
            FieldValue::ExtCostPct(_) => Field::ExtCostPct,
            FieldValue::IntCostPct(_) => Field::IntCostPct,
            FieldValue::Efficiency(_) => Field::Efficiency,
            FieldValue::FixedCosts(_) => Field::FixedCosts,
            FieldValue::Repairs(_) => Field::Repairs,
            FieldValue::FxAdjustment(_) => Field::FxAdjustment,
            FieldValue::ExchangeRate(_) => Field::ExchangeRate,
            FieldValue::Currency(_) => Field::Currency,
        }
    }

    /// The numeric payload, if any
    pub fn number(&self) -> Option<f64> {
        match *self {
            FieldValue::ExternalSales(v)
            | FieldValue::InternalSales(v)
            | FieldValue::ExtCostPct(v)
            | FieldValue::IntCostPct(v)
            | FieldValue::Efficiency(v)
            | FieldValue::FixedCosts(v)
            | FieldValue::Repairs(v)
            | FieldValue::FxAdjustment(v)
            | FieldValue::ExchangeRate(v) => Some(v),
            FieldValue::Currency(_) => None,
        }
    }

    /// Same field with a different number (used for unit conversion)
    pub fn with_number(&self, value: f64) -> Self {
        Self::numeric(self.field(), value).unwrap_or(*self)
    }

    /// Check the value against the field's domain
    pub fn check(&self) -> ValidationResult<()> {
        let field = self.field();
        if let (Some(domain), Some(value)) = (field.domain(), self.number()) {
            domain.check(field.name(), value)?;
        }
        Ok(())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.number(), self) {
            (Some(v), _) => write!(f, "{}={}", self.field(), v),
            (None, FieldValue::Currency(c)) => write!(f, "{}={}", self.field(), c),
            (None, _) => write!(f, "{}", self.field()),
        }
    }
}

/// Parses `name=value`, as given on the command line
impl FromStr for FieldValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s.split_once('=').ok_or_else(|| ValidationError::InvalidValue {
            field: s.to_string(),
            reason: "expected name=value".to_string(),
        })?;
        FieldValue::parse(name, value)
    }
}
