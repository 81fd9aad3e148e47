use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_core::loan::LoanInput;
use mortgage_core::property::{self, HouseInput};

use crate::input;

/// Arguments describing a financed property
#[derive(Args)]
pub struct HouseCostArgs {
    /// Financed amount (e.g. 100000)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual interest rate in percent (e.g. 3.5)
    #[arg(long, alias = "rate")]
    pub annual_rate: Option<Decimal>,

    /// Term in years
    #[arg(long, alias = "years")]
    pub term_years: Option<u32>,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual home insurance premium
    #[arg(long)]
    pub home_insurance: Option<Decimal>,

    /// Annual maintenance budget
    #[arg(long)]
    pub maintenance: Option<Decimal>,

    /// Monthly community fees
    #[arg(long)]
    pub community_fees: Option<Decimal>,

    /// Monthly utilities estimate
    #[arg(long)]
    pub utilities: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the merged cost schedule
#[derive(Args)]
pub struct HouseScheduleArgs {
    #[command(flatten)]
    pub house: HouseCostArgs,
}

pub fn run_house_cost(args: HouseCostArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let house_input = resolve_house_input(&args)?;
    let result = property::build_cost_breakdown(&house_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_house_schedule(args: HouseScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let house_input = resolve_house_input(&args.house)?;
    let result = property::build_house_schedule(&house_input)?;
    Ok(serde_json::to_value(result)?)
}

fn resolve_house_input(args: &HouseCostArgs) -> Result<HouseInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Ok(HouseInput {
        loan: LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            term_years: args
                .term_years
                .ok_or("--term-years is required (or provide --input)")?,
        },
        annual_property_tax: args.property_tax.unwrap_or(Decimal::ZERO),
        annual_home_insurance: args.home_insurance.unwrap_or(Decimal::ZERO),
        annual_maintenance: args.maintenance.unwrap_or(Decimal::ZERO),
        community_fees: args.community_fees.unwrap_or(Decimal::ZERO),
        utilities: args.utilities.unwrap_or(Decimal::ZERO),
    })
}
