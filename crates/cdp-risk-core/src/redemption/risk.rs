use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::brackets::{validate_loans, BracketIndex, InterestRate, LoanRecord, RateBracket};
use super::debt_in_front::{calculate_debt_in_front, DebtInFrontResult, ExcludedLoan};
use crate::types::{require_non_negative, with_metadata, ComputationOutput, Money, RiskLevel};
use crate::CdpRiskResult;

/// Below this share of debt in front, a position is first in line.
pub const HIGH_RISK_THRESHOLD: Decimal = dec!(0.10);
/// Below this share (and at or above `HIGH_RISK_THRESHOLD`) risk is Medium.
pub const MEDIUM_RISK_THRESHOLD: Decimal = dec!(0.25);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionRiskInput {
    pub loans: Vec<LoanRecord>,
    pub interest_rate: InterestRate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_loan: Option<ExcludedLoan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionRiskOutput {
    pub interest_rate: InterestRate,
    pub bracket: RateBracket,
    pub debt_in_front: Money,
    pub total_debt: Money,
    pub debt_in_front_ratio: Option<Decimal>,
    pub redemption_risk: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_loan_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Map debt-in-front to a redemption risk tier.
///
/// The mapping is inverted on purpose: little debt in front means the
/// position is among the first redeemed (High), lots of debt in front
/// shields it (Low). An empty branch has nothing to redeem and is Low.
pub fn classify_redemption_risk(result: &DebtInFrontResult) -> RiskLevel {
    match result.ratio() {
        None => RiskLevel::Low,
        Some(r) if r < HIGH_RISK_THRESHOLD => RiskLevel::High,
        Some(r) if r < MEDIUM_RISK_THRESHOLD => RiskLevel::Medium,
        Some(_) => RiskLevel::Low,
    }
}

/// Build the bracket index from a snapshot, compute debt-in-front for the
/// requested rate and classify the resulting redemption risk.
pub fn analyze_redemption_risk(
    input: &RedemptionRiskInput,
) -> CdpRiskResult<ComputationOutput<RedemptionRiskOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loans(&input.loans)?;
    let excluded = match input.excluded_loan {
        Some(ref requested) => {
            require_non_negative(requested.debt, "excluded_loan.debt")?;
            let found = ExcludedLoan::find(&input.loans, &requested.id, input.branch_id);
            match found {
                None => warnings.push(format!(
                    "Excluded loan '{}' has no debt in the snapshot; nothing was excluded.",
                    requested.id
                )),
                Some(ref own)
                    if own.interest_rate != requested.interest_rate
                        || own.debt != requested.debt =>
                {
                    warnings.push(format!(
                        "Excluded loan '{}' differs from the snapshot; excluding the snapshot's {} at {}.",
                        own.id, own.debt, own.interest_rate
                    ))
                }
                Some(_) => {}
            }
            found
        }
        None => None,
    };

    let index = match input.branch_id {
        Some(branch) => BracketIndex::build_for_branch(&input.loans, branch),
        None => BracketIndex::build(&input.loans),
    };

    let result = calculate_debt_in_front(&index, input.interest_rate, excluded.as_ref());
    let redemption_risk = classify_redemption_risk(&result);

    if result.total_debt.is_zero() {
        warnings.push("Snapshot carries no debt; redemption risk defaults to Low.".into());
    } else if redemption_risk == RiskLevel::High {
        warnings.push(format!(
            "Less than {}% of branch debt is ahead of {}; this position is among the first to be redeemed.",
            (HIGH_RISK_THRESHOLD * dec!(100)).normalize(),
            input.interest_rate
        ));
    }

    let output = RedemptionRiskOutput {
        interest_rate: input.interest_rate,
        bracket: input.interest_rate.bracket(),
        debt_in_front: result.debt_in_front,
        total_debt: result.total_debt,
        debt_in_front_ratio: result.ratio(),
        redemption_risk,
        excluded_loan_id: excluded.as_ref().map(|l| l.id.clone()),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Redemption risk via debt in lower-rate brackets",
        &serde_json::json!({
            "high_risk_below": HIGH_RISK_THRESHOLD,
            "medium_risk_below": MEDIUM_RISK_THRESHOLD,
            "own_bracket_counted_in_front": false,
            "self_exclusion": excluded.is_some(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
