use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use cdp_risk_core::incentives::rebate::{self, RebateInput};

use crate::input;

/// Arguments for the interest rebate calculation
#[derive(Args)]
pub struct RebateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub borrow_amount: Option<Decimal>,

    /// Nominal annual interest rate in percent (10 = 10%)
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Share of interest rebated (0.4 = 40%)
    #[arg(long)]
    pub rebate_rate: Option<Decimal>,
}

pub fn run_rebate(args: RebateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rebate_input: RebateInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        RebateInput {
            borrow_amount: args.borrow_amount
                .ok_or("--borrow-amount is required (or provide --input)")?,
            interest_rate_percent: args.interest_rate
                .ok_or("--interest-rate is required (or provide --input)")?,
            rebate_rate: args.rebate_rate
                .ok_or("--rebate-rate is required (or provide --input)")?,
        }
    };
    let result = rebate::calculate_rebate(&rebate_input)?;
    Ok(serde_json::to_value(result)?)
}
