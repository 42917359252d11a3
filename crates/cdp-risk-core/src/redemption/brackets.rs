//! Interest-rate bracket index.
//!
//! The rate domain is tiled into half-open brackets `[start, start + increment)`:
//! - below 5%, brackets are 0.1% wide, starting at the 0.5% floor;
//! - from 5% upward, brackets are 0.5% wide.
//!
//! A `BracketIndex` is rebuilt from a loan snapshot on every query. It keeps
//! only the per-bracket debt aggregates (never the loans themselves) frozen
//! into a sorted vector with prefix sums, so lookups by rate are a binary
//! search and nothing is patched incrementally.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::fixed_point::{from_fixed, ONCHAIN_DECIMALS};
use crate::types::{require_non_negative, with_metadata, ComputationOutput, Money, Rate};
use crate::{CdpRiskError, CdpRiskResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest annual interest rate a position may choose (0.5%).
pub const MIN_INTEREST_RATE: Rate = dec!(0.005);
/// Highest annual interest rate a position may choose (20%).
pub const MAX_INTEREST_RATE: Rate = dec!(0.20);
/// First bracket start of the coarse regime.
pub const REGIME_SWITCH_RATE: Rate = dec!(0.05);
pub const FINE_INCREMENT: Rate = dec!(0.001);
pub const COARSE_INCREMENT: Rate = dec!(0.005);

// ---------------------------------------------------------------------------
// Interest rate
// ---------------------------------------------------------------------------

/// Annual interest rate validated against `[MIN_INTEREST_RATE, MAX_INTEREST_RATE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct InterestRate(Rate);

impl InterestRate {
    pub fn new(rate: Rate) -> CdpRiskResult<Self> {
        if rate < MIN_INTEREST_RATE || rate > MAX_INTEREST_RATE {
            return Err(CdpRiskError::InterestRateOutOfRange { rate });
        }
        Ok(Self(rate))
    }

    /// Clamp any rate into the supported range instead of rejecting it.
    pub fn clamped(rate: Rate) -> Self {
        Self(rate.clamp(MIN_INTEREST_RATE, MAX_INTEREST_RATE))
    }

    /// Accept a percentage (`5` for 5%).
    pub fn from_percent(percent: Decimal) -> CdpRiskResult<Self> {
        Self::new(percent / dec!(100))
    }

    pub fn value(&self) -> Rate {
        self.0
    }

    pub fn bracket(&self) -> RateBracket {
        RateBracket::containing(self.0)
    }
}

impl TryFrom<Decimal> for InterestRate {
    type Error = CdpRiskError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InterestRate> for Decimal {
    fn from(rate: InterestRate) -> Self {
        rate.0
    }
}

impl std::fmt::Display for InterestRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", (self.0 * dec!(100)).normalize())
    }
}

// ---------------------------------------------------------------------------
// Brackets
// ---------------------------------------------------------------------------

/// Width of the bracket that begins at `start`.
pub fn bracket_increment(start: Rate) -> Rate {
    if start < REGIME_SWITCH_RATE {
        FINE_INCREMENT
    } else {
        COARSE_INCREMENT
    }
}

/// Half-open interval `[start, start + increment)` of interest rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateBracket {
    pub start: Rate,
    pub increment: Rate,
}

impl RateBracket {
    /// The unique bracket containing `rate`. A rate equal to a bracket start
    /// belongs to that bracket, never the one before it.
    pub fn containing(rate: Rate) -> Self {
        let (origin, increment) = if rate < REGIME_SWITCH_RATE {
            (MIN_INTEREST_RATE, FINE_INCREMENT)
        } else {
            (REGIME_SWITCH_RATE, COARSE_INCREMENT)
        };
        let steps = ((rate - origin) / increment).floor();
        let start = (origin + steps * increment).normalize();
        Self { start, increment }
    }

    /// The bracket at the domain floor.
    pub fn first() -> Self {
        Self::containing(MIN_INTEREST_RATE)
    }

    pub fn end(&self) -> Rate {
        self.start + self.increment
    }

    pub fn contains(&self, rate: Rate) -> bool {
        rate >= self.start && rate < self.end()
    }

    pub fn next(&self) -> Self {
        let start = self.end().normalize();
        Self {
            start,
            increment: bracket_increment(start),
        }
    }
}

/// Every bracket tiling `[MIN_INTEREST_RATE, MAX_INTEREST_RATE)`, in order.
pub fn domain_brackets() -> impl Iterator<Item = RateBracket> {
    std::iter::successors(Some(RateBracket::first()), |b| Some(b.next()))
        .take_while(|b| b.start < MAX_INTEREST_RATE)
}

// ---------------------------------------------------------------------------
// Loan snapshot records
// ---------------------------------------------------------------------------

/// One position as read from the ledger. Read-only input for a single query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: String,
    pub branch_id: u32,
    pub interest_rate: InterestRate,
    pub recorded_debt: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A loan as delivered by an indexer: 18-decimal base-unit integers encoded
/// as strings, timestamp in unix seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLoanRecord {
    pub id: String,
    pub branch_id: u32,
    pub interest_rate: String,
    pub recorded_debt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl TryFrom<RawLoanRecord> for LoanRecord {
    type Error = CdpRiskError;

    fn try_from(raw: RawLoanRecord) -> Result<Self, Self::Error> {
        let interest_rate = InterestRate::new(from_fixed(&raw.interest_rate, ONCHAIN_DECIMALS)?)?;
        let recorded_debt = from_fixed(&raw.recorded_debt, ONCHAIN_DECIMALS)?;
        require_non_negative(recorded_debt, "recorded_debt")?;
        let updated_at = match raw.updated_at {
            Some(secs) => Some(DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
                CdpRiskError::InvalidInput {
                    field: "updated_at".into(),
                    reason: format!("{secs} is not a valid unix timestamp"),
                }
            })?),
            None => None,
        };
        Ok(LoanRecord {
            id: raw.id,
            branch_id: raw.branch_id,
            interest_rate,
            recorded_debt,
            updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Total debt recorded in one bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketAggregate {
    pub bracket: RateBracket,
    pub debt: Money,
}

/// Immutable per-bracket debt aggregates for one snapshot.
#[derive(Debug, Clone, Default)]
pub struct BracketIndex {
    aggregates: Vec<BracketAggregate>,
    /// `prefix[i]` is the debt of all aggregates before index `i`;
    /// the final entry is the total.
    prefix: Vec<Money>,
    rate_weighted_debt: Decimal,
}

impl BracketIndex {
    /// Group a snapshot by bracket. Loans with zero debt are skipped.
    pub fn build(loans: &[LoanRecord]) -> Self {
        Self::build_filtered(loans.iter())
    }

    /// Like [`BracketIndex::build`], ignoring loans from other branches.
    pub fn build_for_branch(loans: &[LoanRecord], branch_id: u32) -> Self {
        Self::build_filtered(loans.iter().filter(|l| l.branch_id == branch_id))
    }

    fn build_filtered<'a>(loans: impl Iterator<Item = &'a LoanRecord>) -> Self {
        let mut grouped: BTreeMap<Rate, Money> = BTreeMap::new();
        let mut rate_weighted_debt = Decimal::ZERO;

        for loan in loans {
            if loan.recorded_debt.is_zero() {
                continue;
            }
            let bracket = loan.interest_rate.bracket();
            *grouped.entry(bracket.start).or_insert(Decimal::ZERO) += loan.recorded_debt;
            rate_weighted_debt += loan.interest_rate.value() * loan.recorded_debt;
        }

        let mut aggregates = Vec::with_capacity(grouped.len());
        let mut prefix = Vec::with_capacity(grouped.len() + 1);
        let mut running = Decimal::ZERO;
        prefix.push(running);
        for (start, debt) in grouped {
            aggregates.push(BracketAggregate {
                bracket: RateBracket {
                    start,
                    increment: bracket_increment(start),
                },
                debt,
            });
            running += debt;
            prefix.push(running);
        }

        Self {
            aggregates,
            prefix,
            rate_weighted_debt,
        }
    }

    /// Debt in every bracket strictly below the bracket containing `rate`.
    pub fn aggregate_below(&self, rate: Rate) -> Money {
        let start = RateBracket::containing(rate).start;
        let idx = self.aggregates.partition_point(|a| a.bracket.start < start);
        self.prefix.get(idx).copied().unwrap_or(Decimal::ZERO)
    }

    /// Debt in the bracket containing `rate`.
    pub fn debt_at(&self, rate: Rate) -> Money {
        let start = RateBracket::containing(rate).start;
        self.aggregates
            .binary_search_by(|a| a.bracket.start.cmp(&start))
            .map(|i| self.aggregates[i].debt)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self) -> Money {
        self.prefix.last().copied().unwrap_or(Decimal::ZERO)
    }

    /// Populated brackets in ascending rate order.
    pub fn brackets(&self) -> &[BracketAggregate] {
        &self.aggregates
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Debt-weighted mean interest rate, `None` when the snapshot carries no debt.
    pub fn weighted_average_rate(&self) -> Option<Rate> {
        let total = self.total();
        if total.is_zero() {
            None
        } else {
            Some(self.rate_weighted_debt / total)
        }
    }
}

// ---------------------------------------------------------------------------
// Boundary API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketDistributionInput {
    pub loans: Vec<LoanRecord>,
    /// Restrict the snapshot to one branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketDistributionOutput {
    pub brackets: Vec<BracketAggregate>,
    pub total_debt: Money,
    pub loan_count: usize,
    pub weighted_average_rate: Option<Rate>,
}

/// Per-bracket debt distribution of a loan snapshot.
pub fn bracket_distribution(
    input: &BracketDistributionInput,
) -> CdpRiskResult<ComputationOutput<BracketDistributionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loans(&input.loans)?;

    let index = match input.branch_id {
        Some(branch) => BracketIndex::build_for_branch(&input.loans, branch),
        None => BracketIndex::build(&input.loans),
    };
    let loan_count = input
        .loans
        .iter()
        .filter(|l| input.branch_id.map_or(true, |b| l.branch_id == b))
        .count();

    if index.is_empty() {
        warnings.push("Snapshot contains no debt.".into());
    }

    let output = BracketDistributionOutput {
        brackets: index.brackets().to_vec(),
        total_debt: index.total(),
        loan_count,
        weighted_average_rate: index.weighted_average_rate(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Interest-rate bracket distribution",
        &serde_json::json!({
            "fine_increment": FINE_INCREMENT,
            "coarse_increment": COARSE_INCREMENT,
            "regime_switch": REGIME_SWITCH_RATE,
            "branch_id": input.branch_id,
        }),
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn validate_loans(loans: &[LoanRecord]) -> CdpRiskResult<()> {
    for (i, loan) in loans.iter().enumerate() {
        require_non_negative(loan.recorded_debt, &format!("loans[{i}].recorded_debt"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
