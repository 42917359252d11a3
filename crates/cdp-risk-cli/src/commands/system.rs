use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use cdp_risk_core::system::tcr::{self, TcrQuery};

use super::BranchArgs;
use crate::input;

/// Arguments for a TCR / recovery mode check
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct TcrCheckArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current total collateral of the branch
    #[arg(long)]
    pub total_collateral: Option<Decimal>,

    /// Current total debt of the branch
    #[arg(long)]
    pub total_debt: Option<Decimal>,

    /// USD price of one unit of collateral
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Critical collateralization ratio (1.5 = 150%); overrides --branch
    #[arg(long)]
    pub ccr: Option<Decimal>,

    /// Collateral added (positive) or withdrawn (negative)
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub collateral_change: Decimal,

    /// Debt drawn (positive) or repaid (negative)
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub debt_change: Decimal,

    #[command(flatten)]
    pub branch: BranchArgs,
}

pub fn run_tcr_check(args: TcrCheckArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let query: TcrQuery = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let ccr = match args.ccr {
            Some(ccr) => ccr,
            None => args
                .branch
                .resolve()?
                .map(|b| b.ccr)
                .ok_or("--ccr or --branch is required (or provide --input)")?,
        };
        TcrQuery {
            current_total_collateral: args.total_collateral
                .ok_or("--total-collateral is required (or provide --input)")?,
            current_total_debt: args.total_debt
                .ok_or("--total-debt is required (or provide --input)")?,
            collateral_price: args.price
                .ok_or("--price is required (or provide --input)")?,
            ccr,
            collateral_change: args.collateral_change,
            debt_change: args.debt_change,
        }
    };

    let result = tcr::check_operation(&query)?;
    Ok(serde_json::to_value(result)?)
}
