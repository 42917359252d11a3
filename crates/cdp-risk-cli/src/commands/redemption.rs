use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use cdp_risk_core::redemption::brackets::{self, BracketDistributionInput};
use cdp_risk_core::redemption::risk::{self, RedemptionRiskInput};

use crate::input;

/// Arguments for debt-in-front / redemption risk analysis
#[derive(Args)]
pub struct DebtInFrontArgs {
    /// Path to JSON input file (loans, interest_rate, optional excluded_loan)
    #[arg(long)]
    pub input: Option<String>,

    /// Interest rate to evaluate (decimal, 0.05 = 5%); overrides the input file
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Only count loans from this branch
    #[arg(long)]
    pub branch_id: Option<u32>,
}

/// Arguments for the bracket debt distribution
#[derive(Args)]
pub struct BracketsArgs {
    /// Path to JSON input file (loans)
    #[arg(long)]
    pub input: Option<String>,

    /// Only count loans from this branch
    #[arg(long)]
    pub branch_id: Option<u32>,
}

pub fn run_debt_in_front(args: DebtInFrontArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut data: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for debt-in-front analysis".into());
    };

    if let Value::Object(ref mut map) = data {
        if let Some(rate) = args.rate {
            map.insert("interest_rate".into(), serde_json::to_value(rate)?);
        }
        if let Some(branch) = args.branch_id {
            map.insert("branch_id".into(), Value::from(branch));
        }
    }

    let risk_input: RedemptionRiskInput = serde_json::from_value(data)?;
    let result = risk::analyze_redemption_risk(&risk_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_brackets(args: BracketsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut dist_input: BracketDistributionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for bracket distribution".into());
    };
    if args.branch_id.is_some() {
        dist_input.branch_id = args.branch_id;
    }
    let result = brackets::bracket_distribution(&dist_input)?;
    Ok(serde_json::to_value(result)?)
}
