use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{
    checked_mul_div, overflow, require_non_negative, require_positive, with_metadata,
    ComputationOutput, Money, Percent, Rate,
};
use crate::{CdpRiskError, CdpRiskResult};

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebateInput {
    pub borrow_amount: Money,
    /// Nominal annual rate in percent (10 = 10%).
    pub interest_rate_percent: Percent,
    /// Share of interest refunded (0.4 = 40%).
    pub rebate_rate: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebateResult {
    pub rebate_percentage: Percent,
    /// Annual rate after the rebate, in percent.
    pub effective_rate: Percent,
    pub yearly_interest: Money,
    pub effective_yearly_interest: Money,
    pub yearly_rebate: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Effective rate and yearly savings from an interest rebate. `None` when
/// nothing is borrowed. Amounts are left at full precision.
pub fn calculate_rebate_result(
    borrow_amount: Money,
    interest_rate_percent: Percent,
    rebate_rate: Rate,
) -> Option<RebateResult> {
    if borrow_amount <= Decimal::ZERO {
        return None;
    }

    let rebate_percentage = rebate_rate.checked_mul(HUNDRED)?;
    let effective_rate = interest_rate_percent.checked_mul(Decimal::ONE.checked_sub(rebate_rate)?)?;
    let yearly_interest = checked_mul_div(borrow_amount, interest_rate_percent, HUNDRED)?;
    let effective_yearly_interest = checked_mul_div(borrow_amount, effective_rate, HUNDRED)?;

    Some(RebateResult {
        rebate_percentage,
        effective_rate,
        yearly_interest,
        effective_yearly_interest,
        yearly_rebate: yearly_interest.checked_sub(effective_yearly_interest)?,
    })
}

pub fn calculate_rebate(input: &RebateInput) -> CdpRiskResult<ComputationOutput<RebateResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative(input.interest_rate_percent, "interest_rate_percent")?;
    if input.rebate_rate < Decimal::ZERO || input.rebate_rate > Decimal::ONE {
        return Err(CdpRiskError::InvalidInput {
            field: "rebate_rate".into(),
            reason: "Rebate rate must be between 0 and 1.".into(),
        });
    }

    require_positive(input.borrow_amount, "borrow_amount")?;

    let result = calculate_rebate_result(
        input.borrow_amount,
        input.interest_rate_percent,
        input.rebate_rate,
    )
    .ok_or_else(|| overflow("yearly interest"))?;

    if input.rebate_rate.is_zero() {
        warnings.push("Rebate rate is zero; effective rate equals the nominal rate.".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Interest rebate (effective rate and yearly savings)",
        &serde_json::json!({
            "effective_rate": "nominal * (1 - rebate)",
            "rounding": "none",
        }),
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forty_percent_rebate() {
        let r = calculate_rebate_result(dec!(10000), dec!(10), dec!(0.4)).unwrap();
        assert_eq!(r.rebate_percentage, dec!(40));
        assert_eq!(r.effective_rate, dec!(6));
        assert_eq!(r.yearly_interest, dec!(1000));
        assert_eq!(r.effective_yearly_interest, dec!(600));
        assert_eq!(r.yearly_rebate, dec!(400));
    }

    #[test]
    fn test_non_positive_borrow_is_none() {
        assert_eq!(calculate_rebate_result(dec!(0), dec!(10), dec!(0.4)), None);
        assert_eq!(calculate_rebate_result(dec!(-1), dec!(10), dec!(0.4)), None);
    }

    #[test]
    fn test_full_precision_kept() {
        let r = calculate_rebate_result(dec!(1234.56), dec!(7.35), dec!(0.15)).unwrap();
        // 1234.56 * 7.35 / 100 = 90.74016
        assert_eq!(r.yearly_interest, dec!(90.74016));
        // 7.35 * 0.85 = 6.2475
        assert_eq!(r.effective_rate, dec!(6.2475));
        assert_eq!(r.yearly_rebate, r.yearly_interest - r.effective_yearly_interest);
    }

    #[test]
    fn test_envelope_rejects_zero_borrow() {
        let input = RebateInput {
            borrow_amount: dec!(0),
            interest_rate_percent: dec!(5),
            rebate_rate: dec!(0.1),
        };
        match calculate_rebate(&input).unwrap_err() {
            CdpRiskError::InvalidInput { field, .. } => assert_eq!(field, "borrow_amount"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_huge_rate_reports_overflow() {
        let input = RebateInput {
            borrow_amount: dec!(10_000_000_000_000_000_000_000_000),
            interest_rate_percent: dec!(10_000_000_000),
            rebate_rate: dec!(0.5),
        };
        assert_eq!(
            calculate_rebate_result(input.borrow_amount, input.interest_rate_percent, dec!(0.5)),
            None
        );
        match calculate_rebate(&input).unwrap_err() {
            CdpRiskError::ArithmeticOverflow { .. } => {}
            other => panic!("Expected ArithmeticOverflow, got {other:?}"),
        }
    }

    #[test]
    fn test_envelope_rejects_rebate_above_one() {
        let input = RebateInput {
            borrow_amount: dec!(100),
            interest_rate_percent: dec!(5),
            rebate_rate: dec!(1.5),
        };
        assert!(calculate_rebate(&input).is_err());
    }
}
