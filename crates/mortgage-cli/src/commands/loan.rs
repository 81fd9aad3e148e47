use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::loan::{self, LoanInput};

use crate::input;

/// Arguments identifying a single loan
#[derive(Args)]
pub struct PaymentArgs {
    /// Financed amount (e.g. 100000)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate in percent (e.g. 3.5)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in years
    #[arg(long, alias = "years")]
    pub term_years: Option<u32>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub loan: PaymentArgs,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = resolve_loan_input(&args)?;
    let result = loan::build_payment_summary(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = resolve_loan_input(&args.loan)?;
    let result = loan::build_amortization_schedule(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

/// File, then piped stdin, then individual flags.
pub fn resolve_loan_input(args: &PaymentArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Ok(LoanInput {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        annual_rate: args
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?,
        term_years: args
            .term_years
            .ok_or("--term-years is required (or provide --input)")?,
    })
}
