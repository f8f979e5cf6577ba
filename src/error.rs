//! Error types for the profit levers model
//!
//! The model itself does no I/O, so the taxonomy is small: rejected field
//! edits, invalid exchange rates at the currency boundary, and failures while
//! loading an override baseline from disk.

use std::path::PathBuf;
use thiserror::Error;

/// A scenario edit that was rejected. The previous value is always retained.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Unknown scenario field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

/// Currency boundary failures.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CurrencyError {
    #[error("Exchange rate must be positive and finite, got {0}")]
    InvalidRate(f64),
}

/// Failures while loading a baseline override file.
#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("Failed to open baseline file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed baseline CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown baseline parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid value {value:?} for baseline parameter {parameter}")]
    InvalidValue { parameter: String, value: String },

    #[error("Report period {start} .. {end} is empty or inverted")]
    InvalidPeriod {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("Baseline default rejected: {0}")]
    InvalidDefault(#[from] ValidationError),
}

/// Result type alias for scenario edits.
pub type ValidationResult<T> = Result<T, ValidationError>;
