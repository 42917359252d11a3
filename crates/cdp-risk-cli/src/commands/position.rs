use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use cdp_risk_core::position::metrics::{self, PositionInput};

use super::BranchArgs;
use crate::input;

/// Arguments for position health metrics
#[derive(Args)]
pub struct PositionArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Collateral amount in collateral units
    #[arg(long)]
    pub collateral: Option<Decimal>,

    /// Debt amount in stablecoin units
    #[arg(long)]
    pub debt: Option<Decimal>,

    /// USD price of one unit of collateral (omit when unavailable)
    #[arg(long, alias = "collateral-price")]
    pub price: Option<Decimal>,

    /// USD price of the stablecoin
    #[arg(long, default_value_t = dec!(1))]
    pub usdu_price: Decimal,

    /// Minimum collateralization ratio (1.1 = 110%); overrides --branch
    #[arg(long)]
    pub mcr: Option<Decimal>,

    #[command(flatten)]
    pub branch: BranchArgs,
}

pub fn run_position(args: PositionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let position_input: PositionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let mcr = match args.mcr {
            Some(mcr) => mcr,
            None => args
                .branch
                .resolve()?
                .map(|b| b.mcr)
                .ok_or("--mcr or --branch is required (or provide --input)")?,
        };
        PositionInput {
            collateral: args.collateral
                .ok_or("--collateral is required (or provide --input)")?,
            debt: args.debt
                .ok_or("--debt is required (or provide --input)")?,
            collateral_price: args.price,
            usdu_price: args.usdu_price,
            min_collateralization_ratio: mcr,
        }
    };

    let result = metrics::analyze_position(&position_input)?;
    Ok(serde_json::to_value(result)?)
}
