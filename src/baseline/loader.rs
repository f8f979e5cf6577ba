//! CSV-based baseline loader
//!
//! Reads a two-column `parameter,value` file. Parameters not present in the
//! file keep their FY2025 default.

use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{BaselineConstants, ReportPeriod};
use crate::error::BaselineError;

/// Default path to the baseline override file
pub const DEFAULT_BASELINE_PATH: &str = "data/baseline.csv";

/// Load a baseline from a CSV file on disk
pub fn load_baseline(path: &Path) -> Result<BaselineConstants, BaselineError> {
    let file = File::open(path).map_err(|source| BaselineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let baseline = load_baseline_from_reader(file)?;
    log::info!("Loaded baseline '{}' from {}", baseline.label, path.display());
    Ok(baseline)
}

/// Load a baseline from any reader (e.g., string buffer, request body)
pub fn load_baseline_from_reader<R: Read>(reader: R) -> Result<BaselineConstants, BaselineError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut baseline = BaselineConstants::fy2025();
    let mut period_start = baseline.period.start();
    let mut period_end = baseline.period.end();

    for result in csv_reader.records() {
        let record = result?;
        let parameter = record.get(0).unwrap_or_default();
        let value = record.get(1).unwrap_or_default();

        match parameter {
            "label" => baseline.label = value.to_string(),
            "period_start" => period_start = parse_date(parameter, value)?,
            "period_end" => period_end = parse_date(parameter, value)?,
            "external_sales" => baseline.external_sales = parse_number(parameter, value)?,
            "internal_sales" => baseline.internal_sales = parse_number(parameter, value)?,
            "fixed_costs" => baseline.fixed_costs = parse_number(parameter, value)?,
            "operating_profit_outlook" => {
                baseline.operating_profit_outlook = parse_number(parameter, value)?
            }
            "efficiency" => baseline.efficiency = parse_number(parameter, value)?,
            "ext_cost_pct" => baseline.ext_cost_pct = parse_number(parameter, value)?,
            "int_cost_pct" => baseline.int_cost_pct = parse_number(parameter, value)?,
            "repairs" => baseline.repairs_m = parse_number(parameter, value)?,
            "fx_adjustment" => baseline.fx_adjustment_m = parse_number(parameter, value)?,
            "exchange_rate" => baseline.exchange_rate = parse_number(parameter, value)?,
            "display_currency" => {
                baseline.currency = value.parse().map_err(|_| invalid(parameter, value))?
            }
            "native_unit" => baseline.native_unit = value.to_string(),
            "foreign_unit" => baseline.foreign_unit = value.to_string(),
            other => return Err(BaselineError::UnknownParameter(other.to_string())),
        }
    }

    baseline.period = ReportPeriod::new(period_start, period_end)?;
    baseline.validate()?;

    Ok(baseline)
}

fn invalid(parameter: &str, value: &str) -> BaselineError {
    BaselineError::InvalidValue {
        parameter: parameter.to_string(),
        value: value.to_string(),
    }
}

fn parse_number(parameter: &str, value: &str) -> Result<f64, BaselineError> {
    // Report figures are often written with thousands separators
    let cleaned: String = value.chars().filter(|c| *c != ',' && *c != '_').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(parameter, value)),
    }
}

fn parse_date(parameter: &str, value: &str) -> Result<NaiveDate, BaselineError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid(parameter, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_file_keeps_defaults() {
        let baseline = load_baseline_from_reader("parameter,value\n".as_bytes()).unwrap();
        assert_eq!(baseline, BaselineConstants::fy2025());
    }

    #[test]
    fn test_overrides_apply() {
        let data = "\
parameter,value
# revised outlook
label,FY2026 Budget
period_start,2025-07-01
period_end,2026-06-30
external_sales,\"9,600\"
int_cost_pct,0.45
display_currency,foreign
exchange_rate,23.5
";
        let baseline = load_baseline_from_reader(data.as_bytes()).unwrap();

        assert_eq!(baseline.label, "FY2026 Budget");
        assert_eq!(baseline.period.months(), 12);
        assert_relative_eq!(baseline.external_sales_m(), 800.0);
        assert_eq!(baseline.int_cost_pct, 0.45);
        assert_eq!(baseline.currency, Currency::Foreign);
        assert_eq!(baseline.exchange_rate, 23.5);
        // Untouched parameters keep the FY2025 values
        assert_eq!(baseline.internal_sales, 8245.0);
        assert_eq!(baseline.efficiency, 0.51);
    }

    #[test]
    fn test_half_year_period_changes_monthly_divisor() {
        let data = "parameter,value\nperiod_start,2025-01-01\nperiod_end,2025-06-30\nfixed_costs,1851\n";
        let baseline = load_baseline_from_reader(data.as_bytes()).unwrap();
        assert_relative_eq!(baseline.fixed_costs_m(), 308.5);
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let data = "parameter,value\nexternal_margin_pct,17\n";
        let err = load_baseline_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BaselineError::UnknownParameter(ref p) if p == "external_margin_pct"));
    }

    #[test]
    fn test_bad_number_rejected() {
        let data = "parameter,value\nefficiency,high\n";
        let err = load_baseline_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BaselineError::InvalidValue { .. }));
    }

    #[test]
    fn test_out_of_domain_default_rejected() {
        let data = "parameter,value\nexchange_rate,75\n";
        let err = load_baseline_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BaselineError::InvalidDefault(_)));
    }

    #[test]
    fn test_inverted_period_rejected() {
        let data = "parameter,value\nperiod_start,2025-07-01\nperiod_end,2025-01-01\n";
        let err = load_baseline_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BaselineError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_baseline(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, BaselineError::Io { .. }));
    }

    #[test]
    fn test_shipped_baseline_file_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_BASELINE_PATH);
        let baseline = load_baseline(&path).unwrap();
        assert_eq!(baseline, BaselineConstants::fy2025());
    }
}
