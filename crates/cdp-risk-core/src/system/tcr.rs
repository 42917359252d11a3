//! Total collateralization ratio (TCR) checks against the branch CCR.
//!
//! A branch whose TCR falls below its critical collateralization ratio enters
//! recovery mode. These functions evaluate a hypothetical collateral / debt
//! delta before it is submitted.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::time::Instant;

use crate::types::{
    checked_mul_div, overflow, require_non_negative, require_positive, with_metadata,
    ComputationOutput, Money, Percent, Ratio,
};
use crate::CdpRiskResult;

pub const INVALID_OPERATION_MESSAGE: &str = "Invalid operation";

const INFINITY_LABEL: &str = "Infinity";

// ---------------------------------------------------------------------------
// TCR value
// ---------------------------------------------------------------------------

/// A collateralization ratio; `Infinite` when there is no debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tcr {
    Finite(Ratio),
    Infinite,
}

impl Tcr {
    pub fn is_below(&self, threshold: Ratio) -> bool {
        match self {
            Tcr::Finite(r) => *r < threshold,
            Tcr::Infinite => false,
        }
    }

    pub fn value(&self) -> Option<Ratio> {
        match self {
            Tcr::Finite(r) => Some(*r),
            Tcr::Infinite => None,
        }
    }

    /// `None` when infinite or when the percentage exceeds the decimal range.
    pub fn as_percent(&self) -> Option<Percent> {
        self.value().and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
    }
}

impl std::fmt::Display for Tcr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tcr::Finite(r) => write!(f, "{}", r),
            Tcr::Infinite => write!(f, "{}", INFINITY_LABEL),
        }
    }
}

impl Serialize for Tcr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Tcr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(Decimal),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) if s.eq_ignore_ascii_case(INFINITY_LABEL) => Ok(Tcr::Infinite),
            Repr::Text(s) => Decimal::from_str(&s)
                .map(Tcr::Finite)
                .map_err(serde::de::Error::custom),
            Repr::Number(d) => Ok(Tcr::Finite(d)),
        }
    }
}

// ---------------------------------------------------------------------------
// Query / Output types
// ---------------------------------------------------------------------------

/// Branch totals plus the delta an operation would apply to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcrQuery {
    pub current_total_collateral: Money,
    pub current_total_debt: Money,
    pub collateral_price: Money,
    pub ccr: Ratio,
    #[serde(default)]
    pub collateral_change: Money,
    #[serde(default)]
    pub debt_change: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcrCheckOutput {
    pub current_tcr: Tcr,
    pub new_collateral: Money,
    pub new_debt: Money,
    pub resulting_tcr: Option<Tcr>,
    pub would_violate: bool,
    pub in_recovery_mode: bool,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// TCR after applying the query's delta. `None` when the delta would drive
/// collateral or debt negative, or the new totals are out of decimal range.
/// A ratio too large to represent (dust debt left behind) is `Infinite`.
pub fn resulting_tcr(query: &TcrQuery) -> Option<Tcr> {
    let (new_collateral, new_debt) = new_totals(query)?;

    if new_collateral < Decimal::ZERO || new_debt < Decimal::ZERO {
        return None;
    }
    Some(checked_tcr(new_collateral, new_debt, query.collateral_price).unwrap_or(Tcr::Infinite))
}

/// Whether the operation is invalid or would leave the TCR below the CCR.
pub fn would_violate(query: &TcrQuery) -> bool {
    match resulting_tcr(query) {
        None => true,
        Some(tcr) => tcr.is_below(query.ccr),
    }
}

/// User-facing reason the operation is blocked, `None` if it is allowed.
pub fn validation_message(query: &TcrQuery) -> Option<String> {
    match resulting_tcr(query) {
        None => Some(INVALID_OPERATION_MESSAGE.to_string()),
        Some(Tcr::Finite(tcr)) if tcr < query.ccr => Some(format!(
            "This operation would bring the TCR to {}% (below the {}% critical threshold) and trigger Recovery Mode restrictions",
            percent_label(tcr, 1),
            percent_label(query.ccr, 0)
        )),
        Some(_) => None,
    }
}

/// Collateralization of a single position (or any collateral/debt pair).
/// Saturates to `Infinite` when the ratio is beyond the decimal range.
pub fn position_tcr(collateral: Money, debt: Money, price: Money) -> Tcr {
    checked_tcr(collateral, debt, price).unwrap_or(Tcr::Infinite)
}

pub fn is_recovery_mode(
    total_collateral: Money,
    total_debt: Money,
    price: Money,
    ccr: Ratio,
) -> bool {
    position_tcr(total_collateral, total_debt, price).is_below(ccr)
}

/// Evaluate an operation against the branch CCR with validation and warnings.
pub fn check_operation(query: &TcrQuery) -> CdpRiskResult<ComputationOutput<TcrCheckOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_non_negative(query.current_total_collateral, "current_total_collateral")?;
    require_non_negative(query.current_total_debt, "current_total_debt")?;
    require_positive(query.collateral_price, "collateral_price")?;
    require_positive(query.ccr, "ccr")?;

    query
        .ccr
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| overflow("ccr"))?;
    let (new_collateral, new_debt) = new_totals(query).ok_or_else(|| overflow("new totals"))?;

    let current_tcr = checked_tcr(
        query.current_total_collateral,
        query.current_total_debt,
        query.collateral_price,
    )
    .ok_or_else(|| overflow("current_tcr"))?;
    if new_collateral >= Decimal::ZERO && new_debt >= Decimal::ZERO {
        checked_tcr(new_collateral, new_debt, query.collateral_price)
            .ok_or_else(|| overflow("resulting_tcr"))?;
    }

    let in_recovery_mode = current_tcr.is_below(query.ccr);
    if let (true, Some(tcr)) = (in_recovery_mode, current_tcr.value()) {
        warnings.push(format!(
            "Branch is already in Recovery Mode (TCR {}% < CCR {}%).",
            percent_label(tcr, 1),
            percent_label(query.ccr, 0)
        ));
    }

    let output = TcrCheckOutput {
        current_tcr,
        new_collateral,
        new_debt,
        resulting_tcr: resulting_tcr(query),
        would_violate: would_violate(query),
        in_recovery_mode,
        message: validation_message(query),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "System TCR vs CCR (recovery mode check)",
        &serde_json::json!({
            "tcr": "collateral * price / debt",
            "zero_debt": "Infinity (always valid)",
            "negative_totals": "invalid operation",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// `collateral * price / debt`, `Infinite` for no debt and `None` when the
/// ratio does not fit in a decimal.
fn checked_tcr(collateral: Money, debt: Money, price: Money) -> Option<Tcr> {
    if debt <= Decimal::ZERO {
        return Some(Tcr::Infinite);
    }
    checked_mul_div(collateral, price, debt).map(Tcr::Finite)
}

fn new_totals(query: &TcrQuery) -> Option<(Money, Money)> {
    Some((
        query.current_total_collateral.checked_add(query.collateral_change)?,
        query.current_total_debt.checked_add(query.debt_change)?,
    ))
}

fn percent_label(ratio: Ratio, dp: u32) -> String {
    match ratio.checked_mul(Decimal::ONE_HUNDRED) {
        Some(pct) => format_percent(pct, dp),
        None => format!(">{}", Decimal::MAX),
    }
}

/// Round half away from zero to `dp` places and render with exactly `dp` digits.
fn format_percent(value: Percent, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
