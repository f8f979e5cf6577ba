//! Profit Levers CLI
//!
//! Command-line front end for the scenario model: print metrics, export the
//! sensitivity series, build an efficiency grid, or show the baseline.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use profit_levers::{
    required_external_sales, BaselineConstants, BreakEven, Currency, FieldValue, ScenarioRunner,
    ScenarioSession,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "profit-levers", version, about = "Profit levers simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print gross profit, operating profit and break-even for a scenario
    Metrics {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Monthly operating profit target (display units); prints the external sales needed
        #[arg(long, allow_hyphen_values = true)]
        target: Option<f64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write the profit-vs-external-sales series as CSV
    Sensitivity {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Operating profit for several efficiency levels across the sales range
    Grid {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Comma-separated efficiency levels, e.g. 0.4,0.51,0.6
        #[arg(long, value_delimiter = ',', required = true)]
        efficiency: Vec<f64>,
    },
    /// Print the baseline constants as JSON
    Baseline {
        /// Baseline override CSV
        #[arg(long)]
        baseline: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ScenarioArgs {
    /// Baseline override CSV (built-in FY2025 figures if omitted)
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Display currency: native or foreign
    #[arg(long)]
    currency: Option<Currency>,

    /// Exchange rate, foreign units per native unit
    #[arg(long)]
    rate: Option<f64>,

    /// Field edit, repeatable (e.g. --set efficiency=0.6 --set repairs_m=700)
    #[arg(long = "set", value_name = "FIELD=VALUE", allow_hyphen_values = true)]
    edits: Vec<FieldValue>,

    /// Treat money edits as display-unit amounts
    #[arg(long)]
    display_input: bool,
}

fn load_baseline(path: Option<&Path>) -> Result<BaselineConstants> {
    match path {
        Some(p) => BaselineConstants::from_csv_path(p)
            .with_context(|| format!("Failed to load baseline from {}", p.display())),
        None => Ok(BaselineConstants::fy2025()),
    }
}

fn build_session(args: &ScenarioArgs) -> Result<ScenarioSession> {
    let baseline = load_baseline(args.baseline.as_deref())?;
    let mut session = ScenarioSession::new(Arc::new(baseline));

    if let Some(currency) = args.currency {
        session.set_field(FieldValue::Currency(currency))?;
    }
    if let Some(rate) = args.rate {
        session.set_field(FieldValue::ExchangeRate(rate))?;
    }
    session
        .apply(&args.edits, args.display_input)
        .context("Scenario edit rejected")?;

    Ok(session)
}

/// Whole thousands with separators, e.g. -1,405
fn fmt_amount(value: f64) -> String {
    if !value.is_finite() {
        return "unreachable".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[derive(Serialize)]
struct MetricsReport<'a> {
    baseline: &'a str,
    unit: &'a str,
    scenario: profit_levers::ScenarioState,
    native: profit_levers::DerivedMetrics,
    display: profit_levers::DisplayMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_external_sales: Option<BreakEven>,
}

fn run_metrics(args: &ScenarioArgs, target: Option<f64>, json: bool) -> Result<()> {
    let mut session = build_session(args)?;
    let scenario = session.get_scenario();
    let native = session.metrics();
    let display = session.display_metrics()?;
    let unit = session.baseline().unit_label(scenario.currency).to_string();

    let target_sales = match target {
        Some(t) => {
            let native_target = scenario.to_native(t)?;
            Some(required_external_sales(&scenario, native_target).to_display(scenario.currency, scenario.exchange_rate)?)
        }
        None => None,
    };

    if json {
        let report = MetricsReport {
            baseline: &session.baseline().label,
            unit: &unit,
            scenario,
            native,
            display: display.clone(),
            target_external_sales: target_sales,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let baseline = session.baseline();
    println!("Profit Levers - {} ({} .. {})", baseline.label, baseline.period.start(), baseline.period.end());
    println!("Display unit: {}\n", unit);

    println!("{:<32} {:>14}", "Monthly", unit);
    println!("{}", "-".repeat(47));
    println!("{:<32} {:>14}", "External Sales", fmt_amount(scenario.to_display(scenario.external_sales_m)?));
    println!("{:<32} {:>14}", "Internal Sales", fmt_amount(scenario.to_display(scenario.internal_sales_m)?));
    println!("{:<32} {:>13.1}%", "External Base Margin", display.ext_base_margin * 100.0);
    println!("{:<32} {:>13.1}%", "Internal Base Margin", display.int_base_margin * 100.0);
    println!("{:<32} {:>14.2}", "Efficiency", scenario.efficiency);
    println!("{:<32} {:>14}", "External GP", fmt_amount(display.ext_gp));
    println!("{:<32} {:>14}", "Internal GP", fmt_amount(display.int_gp));
    println!("{:<32} {:>14}", "Total GP", fmt_amount(display.total_gp));
    println!("{:<32} {:>14}", "Fixed Costs", fmt_amount(scenario.to_display(scenario.fixed_costs_m)?));
    println!("{:<32} {:>14}", "Repairs & Maintenance", fmt_amount(scenario.to_display(scenario.repairs_m)?));
    println!("{:<32} {:>14}", "FX / Exceptional", fmt_amount(scenario.to_display(scenario.fx_adjustment_m)?));
    println!("{:<32} {:>14}", "Operating Profit", fmt_amount(display.operating_profit));
    println!("{:<32} {:>14}", "Break-even External Sales", fmt_amount(display.break_even.as_f64()));
    if let Some(sales) = target_sales {
        println!("{:<32} {:>14}", "External Sales for Target OP", fmt_amount(sales.as_f64()));
    }

    println!();
    println!("{:<32} {:>14}", "Annualized", unit);
    println!("{}", "-".repeat(47));
    println!("{:<32} {:>14}", "Total Sales", fmt_amount(display.annual_sales));
    println!("{:<32} {:>14}", "Operating Profit", fmt_amount(display.annual_operating_profit));
    println!(
        "{:<32} {:>14}",
        "Report Outlook OP",
        fmt_amount(scenario.to_display(baseline.operating_profit_outlook)?)
    );

    Ok(())
}

fn run_sensitivity(args: &ScenarioArgs, output: Option<&Path>) -> Result<()> {
    let mut session = build_session(args)?;
    let display = session.display_metrics()?;
    let unit = session.baseline().unit_label(display.currency).to_string();

    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Unable to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let mut writer = csv::Writer::from_writer(sink);

    writer.write_record([
        format!("External Sales ({})", unit),
        format!("OP ({})", unit),
    ])?;
    for point in &display.sensitivity {
        writer.write_record([
            format!("{:.2}", point.external_sales),
            format!("{:.2}", point.operating_profit),
        ])?;
    }
    writer.flush()?;

    if let Some(path) = output {
        eprintln!("Wrote {} points to {}", display.sensitivity.len(), path.display());
    }
    Ok(())
}

fn run_grid(args: &ScenarioArgs, efficiencies: &[f64]) -> Result<()> {
    let mut session = build_session(args)?;
    let scenario = session.get_scenario();
    let unit = session.baseline().unit_label(scenario.currency).to_string();

    let runner = ScenarioRunner::with_baseline(Arc::new(session.baseline().clone()));
    let grid = runner.efficiency_grid(&scenario, efficiencies)?;

    println!("Operating profit ({}) by efficiency and external sales\n", unit);
    print!("{:>14}", "Ext Sales");
    for row in &grid.rows {
        print!(" {:>10}", format!("eff {:.2}", row.efficiency));
    }
    println!();
    println!("{}", "-".repeat(14 + 11 * grid.rows.len()));

    for (i, sales) in grid.external_sales.iter().enumerate() {
        print!("{:>14}", fmt_amount(scenario.to_display(*sales)?));
        for row in &grid.rows {
            print!(" {:>10}", fmt_amount(scenario.to_display(row.operating_profit[i])?));
        }
        println!();
    }
    Ok(())
}

#[derive(Serialize)]
struct BaselineReport<'a> {
    #[serde(flatten)]
    baseline: &'a BaselineConstants,
    months: u32,
    external_sales_m: f64,
    internal_sales_m: f64,
    fixed_costs_m: f64,
}

fn run_baseline(path: Option<&Path>) -> Result<()> {
    let baseline = load_baseline(path)?;
    let report = BaselineReport {
        baseline: &baseline,
        months: baseline.period.months(),
        external_sales_m: baseline.external_sales_m(),
        internal_sales_m: baseline.internal_sales_m(),
        fixed_costs_m: baseline.fixed_costs_m(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Metrics { scenario, target, json } => run_metrics(scenario, *target, *json),
        Command::Sensitivity { scenario, output } => run_sensitivity(scenario, output.as_deref()),
        Command::Grid { scenario, efficiency } => run_grid(scenario, efficiency),
        Command::Baseline { baseline } => run_baseline(baseline.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_amount() {
        assert_eq!(fmt_amount(0.0), "0");
        assert_eq!(fmt_amount(721.5), "722");
        assert_eq!(fmt_amount(1306.8), "1,307");
        assert_eq!(fmt_amount(-1405.0), "-1,405");
        assert_eq!(fmt_amount(16_903_000.0), "16,903,000");
        assert_eq!(fmt_amount(-0.4), "0");
        assert_eq!(fmt_amount(f64::INFINITY), "unreachable");
    }

    #[test]
    fn test_cli_parses_edits() {
        let cli = Cli::try_parse_from([
            "profit-levers",
            "metrics",
            "--currency",
            "foreign",
            "--set",
            "efficiency=0.6",
            "--set",
            "fx_adjustment_m=-75",
        ])
        .unwrap();

        match cli.command {
            Command::Metrics { scenario, .. } => {
                assert_eq!(scenario.currency, Some(Currency::Foreign));
                assert_eq!(
                    scenario.edits,
                    vec![FieldValue::Efficiency(0.6), FieldValue::FxAdjustment(-75.0)]
                );
            }
            _ => panic!("expected metrics command"),
        }
    }

    #[test]
    fn test_build_session_applies_selector_before_edits() {
        let args = ScenarioArgs {
            baseline: None,
            currency: Some(Currency::Foreign),
            rate: Some(20.0),
            edits: vec![FieldValue::FixedCosts(6170.0)],
            display_input: true,
        };
        let mut session = build_session(&args).unwrap();
        assert!((session.get_scenario().fixed_costs_m - 308.5).abs() < 1e-9);
    }
}
