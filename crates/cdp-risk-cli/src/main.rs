mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::incentives::RebateArgs;
use commands::position::PositionArgs;
use commands::redemption::{BracketsArgs, DebtInFrontArgs};
use commands::system::TcrCheckArgs;

/// Redemption risk, position health and TCR checks for CDP lending
#[derive(Parser)]
#[command(
    name = "cdpr",
    version,
    about = "Redemption risk, position health and TCR checks for CDP lending",
    long_about = "A CLI for evaluating collateralized debt positions with decimal precision. \
                  Supports debt-in-front and redemption risk by interest-rate bracket, \
                  position LTV / liquidation price, recovery-mode TCR checks and \
                  interest rebates."
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
    /// Debt ahead of an interest rate and the resulting redemption risk
    DebtInFront(DebtInFrontArgs),
    /// Debt per interest-rate bracket for a loan snapshot
    Brackets(BracketsArgs),
    /// Position LTV, liquidation price and collateral ratio
    Position(PositionArgs),
    /// Check whether an operation would push the branch below its CCR
    TcrCheck(TcrCheckArgs),
    /// Effective interest rate after a rebate
    Rebate(RebateArgs),
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
        Commands::DebtInFront(args) => commands::redemption::run_debt_in_front(args),
        Commands::Brackets(args) => commands::redemption::run_brackets(args),
        Commands::Position(args) => commands::position::run_position(args),
        Commands::TcrCheck(args) => commands::system::run_tcr_check(args),
        Commands::Rebate(args) => commands::incentives::run_rebate(args),
        Commands::Version => {
            println!("cdpr {}", env!("CARGO_PKG_VERSION"));
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
