mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::house::{HouseCostArgs, HouseScheduleArgs};
use commands::loan::{PaymentArgs, ScheduleArgs};
use commands::simulate::{CompareArgs, SeriesArgs, SolveRateArgs};

/// Fixed-rate mortgage simulation with decimal precision
#[derive(Parser)]
#[command(
    name = "msim",
    version,
    about = "Fixed-rate mortgage simulation with decimal precision",
    long_about = "A CLI for fixed-rate mortgage analysis with decimal precision. \
                  Computes constant-installment payments, amortization schedules, \
                  property ownership cost overlays, side-by-side comparisons, and \
                  the interest rate required to hit a target monthly payment."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly installment and lifetime totals for a loan
    Payment(PaymentArgs),
    /// Month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Monthly ownership cost breakdown for a financed property
    HouseCost(HouseCostArgs),
    /// Amortization schedule merged with recurring property costs
    HouseSchedule(HouseScheduleArgs),
    /// Side-by-side comparison of loans and properties
    Compare(CompareArgs),
    /// Interest rate required to hit a target monthly payment
    SolveRate(SolveRateArgs),
    /// Payment and cost series across a range of financed amounts
    Series(SeriesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::HouseCost(args) => commands::house::run_house_cost(args),
        Commands::HouseSchedule(args) => commands::house::run_house_schedule(args),
        Commands::Compare(args) => commands::simulate::run_compare(args),
        Commands::SolveRate(args) => commands::simulate::run_solve_rate(args),
        Commands::Series(args) => commands::simulate::run_series(args),
        Commands::Version => {
            println!("msim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
