use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::series::{self, AmountRange};
use mortgage_core::simulator::{self, ComparisonInput, RateSearchInput};

use crate::input;

/// Arguments for a side-by-side comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a JSON document with "loans" and/or "houses" arrays
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for inverting the payment formula
#[derive(Args)]
pub struct SolveRateArgs {
    /// Financed amount (e.g. 100000)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Term in years
    #[arg(long, alias = "years")]
    pub term_years: Option<u32>,

    /// Monthly payment the rate should produce
    #[arg(long, alias = "target")]
    pub target_monthly_payment: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for chart-series generation
#[derive(Args)]
pub struct SeriesArgs {
    /// Path to a JSON document with "loans" and/or "houses" arrays
    #[arg(long)]
    pub input: Option<String>,

    /// Smallest financed amount to sweep
    #[arg(long)]
    pub min: Decimal,

    /// Largest financed amount to sweep (inclusive)
    #[arg(long)]
    pub max: Decimal,

    /// Increment between amounts
    #[arg(long)]
    pub step: Decimal,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison = resolve_comparison_input(args.input.as_deref())?;
    let result = simulator::build_comparison(&comparison)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_solve_rate(args: SolveRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let search: RateSearchInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RateSearchInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            term_years: args
                .term_years
                .ok_or("--term-years is required (or provide --input)")?,
            target_monthly_payment: args
                .target_monthly_payment
                .ok_or("--target-monthly-payment is required (or provide --input)")?,
        }
    };

    let result = simulator::build_rate_search(&search)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_series(args: SeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comparison = resolve_comparison_input(args.input.as_deref())?;
    let range = AmountRange {
        min: args.min,
        max: args.max,
        step: args.step,
    };
    let result = series::build_series(&comparison, &range)?;
    Ok(serde_json::to_value(result)?)
}

/// Comparison documents are too wide for flags: file or piped stdin only.
fn resolve_comparison_input(
    path: Option<&str>,
) -> Result<ComparisonInput, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err("--input file (or piped JSON on stdin) is required".into())
}
