//! Position health: loan-to-value, liquidation price, collateral ratio,
//! USD values and a liquidation-risk tier for a single CDP.
//!
//! Every ratio is guarded by a positivity check on its denominator. A metric
//! that cannot be computed is `0`, except liquidation risk which is `None`
//! so callers can tell "not computable" apart from "Low". Arithmetic is
//! checked: dust collateral against large debt yields `None` rather than a
//! panic.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{
    checked_mul_div, overflow, require_non_negative, require_positive, with_metadata,
    ComputationOutput, Money, Percent, Ratio, RiskLevel,
};
use crate::CdpRiskResult;

pub const DEFAULT_USDU_PRICE: Money = dec!(1);

/// Price at more than this multiple of the liquidation price is Low risk.
pub const LOW_RISK_PRICE_MULTIPLE: Decimal = dec!(2);
/// Price at more than this multiple (up to the Low bound) is Medium risk.
pub const MEDIUM_RISK_PRICE_MULTIPLE: Decimal = dec!(1.5);

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMetrics {
    /// Loan-to-value, percent.
    pub ltv: Percent,
    pub liquidation_price: Money,
    /// Collateral value in USD.
    pub total_value: Money,
    /// Collateral value minus debt value, USD.
    pub net_value: Money,
    /// Collateral value over debt value, percent.
    pub collateral_ratio: Percent,
    pub liquidation_risk: Option<RiskLevel>,
}

fn default_usdu_price() -> Money {
    DEFAULT_USDU_PRICE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionInput {
    pub collateral: Money,
    pub debt: Money,
    /// USD price of one unit of collateral; absent when the feed is unavailable.
    #[serde(default)]
    pub collateral_price: Option<Money>,
    #[serde(default = "default_usdu_price")]
    pub usdu_price: Money,
    pub min_collateralization_ratio: Ratio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionOutput {
    #[serde(flatten)]
    pub metrics: PositionMetrics,
    /// Highest LTV allowed by the MCR, percent.
    pub max_ltv: Percent,
    /// Debt at which the position would sit exactly at the MCR.
    pub max_debt: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute health metrics for one position.
///
/// A collateral price counts as known only when present and positive; the
/// stablecoin price must be positive for the debt-valued ratios. `None` when
/// a metric falls outside the decimal range.
pub fn calculate_position_metrics(
    collateral: Money,
    debt: Money,
    collateral_price: Option<Money>,
    usdu_price: Money,
    min_collateralization_ratio: Ratio,
) -> Option<PositionMetrics> {
    let price = collateral_price.filter(|p| *p > Decimal::ZERO);
    let has_collateral = collateral > Decimal::ZERO;
    let has_debt = debt > Decimal::ZERO;

    let collateral_value = match price {
        Some(p) if has_collateral => Some(collateral.checked_mul(p)?),
        _ => None,
    };
    let debt_value = if has_debt && usdu_price > Decimal::ZERO {
        Some(debt.checked_mul(usdu_price)?)
    } else {
        None
    };

    let total_value = collateral_value.unwrap_or(Decimal::ZERO);

    let net_value = match (collateral_value, has_debt) {
        (Some(cv), true) => cv.checked_sub(debt.checked_mul(usdu_price)?)?,
        _ => Decimal::ZERO,
    };

    let liquidation_price = if has_collateral && has_debt {
        checked_mul_div(debt, min_collateralization_ratio, collateral)?
    } else {
        Decimal::ZERO
    };

    let (ltv, collateral_ratio) = match (collateral_value, debt_value) {
        (Some(cv), Some(dv)) => (
            checked_mul_div(dv, HUNDRED, cv)?,
            checked_mul_div(cv, HUNDRED, dv)?,
        ),
        _ => (Decimal::ZERO, Decimal::ZERO),
    };

    // A price-to-liquidation multiple beyond the decimal range is Low
    let liquidation_risk = match price {
        Some(p) if liquidation_price > Decimal::ZERO => Some(
            p.checked_div(liquidation_price)
                .map(classify_liquidation_risk)
                .unwrap_or(RiskLevel::Low),
        ),
        _ => None,
    };

    Some(PositionMetrics {
        ltv,
        liquidation_price,
        total_value,
        net_value,
        collateral_ratio,
        liquidation_risk,
    })
}

/// Tier from how far the collateral price sits above the liquidation price.
pub fn classify_liquidation_risk(price_to_liquidation: Decimal) -> RiskLevel {
    if price_to_liquidation > LOW_RISK_PRICE_MULTIPLE {
        RiskLevel::Low
    } else if price_to_liquidation > MEDIUM_RISK_PRICE_MULTIPLE {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Highest loan-to-value permitted by `mcr`, in percent. `Some(0)` for a
/// non-positive `mcr`, `None` when the result is out of range.
pub fn max_ltv(mcr: Ratio) -> Option<Percent> {
    if mcr > Decimal::ZERO {
        HUNDRED.checked_div(mcr)
    } else {
        Some(Decimal::ZERO)
    }
}

/// Largest debt the collateral supports at exactly `mcr`. `Some(0)` if any
/// input is non-positive, `None` when the result is out of range.
pub fn max_debt(collateral: Money, collateral_price: Money, mcr: Ratio) -> Option<Money> {
    if collateral > Decimal::ZERO && collateral_price > Decimal::ZERO && mcr > Decimal::ZERO {
        checked_mul_div(collateral, collateral_price, mcr)
    } else {
        Some(Decimal::ZERO)
    }
}

/// Validate a position query and compute its metrics with MCR headroom.
pub fn analyze_position(input: &PositionInput) -> CdpRiskResult<ComputationOutput<PositionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative(input.collateral, "collateral")?;
    require_non_negative(input.debt, "debt")?;
    if let Some(price) = input.collateral_price {
        require_positive(price, "collateral_price")?;
    }
    require_positive(input.usdu_price, "usdu_price")?;
    require_positive(input.min_collateralization_ratio, "min_collateralization_ratio")?;

    let mcr = input.min_collateralization_ratio;
    let metrics = calculate_position_metrics(
        input.collateral,
        input.debt,
        input.collateral_price,
        input.usdu_price,
        mcr,
    )
    .ok_or_else(|| overflow("position metrics"))?;

    match input.collateral_price {
        None => warnings.push(
            "Collateral price unavailable; value-based metrics are zero and liquidation risk is undefined."
                .into(),
        ),
        Some(price) => {
            if metrics.liquidation_price > Decimal::ZERO && price <= metrics.liquidation_price {
                warnings.push(format!(
                    "Collateral price {price} is at or below the liquidation price {}; the position can be liquidated.",
                    metrics.liquidation_price.round_dp(2)
                ));
            } else if metrics.liquidation_risk == Some(RiskLevel::High) {
                warnings.push(format!(
                    "Collateral price is within {MEDIUM_RISK_PRICE_MULTIPLE}x of the liquidation price."
                ));
            }
        }
    }

    let max_debt = match input.collateral_price {
        Some(p) => max_debt(input.collateral, p, mcr).ok_or_else(|| overflow("max_debt"))?,
        None => Decimal::ZERO,
    };
    let output = PositionOutput {
        metrics,
        max_ltv: max_ltv(mcr).ok_or_else(|| overflow("max_ltv"))?,
        max_debt,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Position health (LTV, liquidation price, collateral ratio)",
        &serde_json::json!({
            "mcr": mcr,
            "usdu_price": input.usdu_price,
            "low_risk_above_price_multiple": LOW_RISK_PRICE_MULTIPLE,
            "medium_risk_above_price_multiple": MEDIUM_RISK_PRICE_MULTIPLE,
            "percentages_unrounded": true,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
