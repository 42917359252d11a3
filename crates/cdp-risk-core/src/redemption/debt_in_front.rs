//! Debt ahead of a rate in the redemption queue.
//!
//! Redemptions consume the lowest-rate positions first, so the debt sitting in
//! brackets below a position's rate is the buffer protecting it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::brackets::{BracketIndex, InterestRate, LoanRecord};
use crate::types::{Money, Rate};

/// A position left out of its own bracket aggregate, usually the one being
/// edited while previewing a new rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedLoan {
    pub id: String,
    /// The loan's current rate; its debt is removed from this bracket.
    pub interest_rate: InterestRate,
    pub debt: Money,
}

impl ExcludedLoan {
    /// The snapshot entry for `id`, restricted to `branch_id` when given.
    /// `None` when the loan carries no debt in that part of the snapshot, in
    /// which case there is nothing of its own to exclude.
    pub fn find(loans: &[LoanRecord], id: &str, branch_id: Option<u32>) -> Option<Self> {
        loans
            .iter()
            .filter(|l| branch_id.map_or(true, |b| l.branch_id == b))
            .find(|l| l.id == id && !l.recorded_debt.is_zero())
            .map(|l| ExcludedLoan {
                id: l.id.clone(),
                interest_rate: l.interest_rate,
                debt: l.recorded_debt,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebtInFrontResult {
    pub debt_in_front: Money,
    pub total_debt: Money,
}

impl DebtInFrontResult {
    /// Share of the branch debt ahead of the rate, `None` with no debt at all.
    pub fn ratio(&self) -> Option<Decimal> {
        if self.total_debt.is_zero() {
            None
        } else {
            Some(self.debt_in_front / self.total_debt)
        }
    }
}

/// Debt in brackets strictly below `rate`'s bracket, and the snapshot total.
///
/// `excluded` is deliberately not optional-by-default: pass `None` when no
/// position is being edited. It must describe debt that is in `index` (see
/// [`ExcludedLoan::find`]); that debt is subtracted from the bracket holding
/// the loan's current rate (capped at that bracket's aggregate) before either
/// sum is taken.
pub fn calculate_debt_in_front(
    index: &BracketIndex,
    rate: InterestRate,
    excluded: Option<&ExcludedLoan>,
) -> DebtInFrontResult {
    let query = rate.bracket();
    let mut debt_in_front = index.aggregate_below(rate.value());
    let mut total_debt = index.total();

    if let Some(loan) = excluded {
        let own = loan.interest_rate.bracket();
        let removable = loan
            .debt
            .max(Decimal::ZERO)
            .min(index.debt_at(own.start));
        total_debt -= removable;
        if own.start < query.start {
            debt_in_front -= removable;
        }
    }

    DebtInFrontResult {
        debt_in_front,
        total_debt,
    }
}

/// Debt-in-front for each candidate rate, e.g. to draw a rate picker.
pub fn debt_in_front_curve(
    index: &BracketIndex,
    rates: &[Rate],
    excluded: Option<&ExcludedLoan>,
) -> Vec<(InterestRate, DebtInFrontResult)> {
    rates
        .iter()
        .map(|r| InterestRate::clamped(*r))
        .map(|r| (r, calculate_debt_in_front(index, r, excluded)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redemption::brackets::LoanRecord;
    use rust_decimal_macros::dec;

    fn rate(r: Decimal) -> InterestRate {
        InterestRate::new(r).unwrap()
    }

    fn loan(id: &str, r: Decimal, debt: Decimal) -> LoanRecord {
        LoanRecord {
            id: id.into(),
            branch_id: 0,
            interest_rate: rate(r),
            recorded_debt: debt,
            updated_at: None,
        }
    }

    fn scenario_index() -> BracketIndex {
        BracketIndex::build(&[
            loan("a", dec!(0.01), dec!(1000)),
            loan("b", dec!(0.03), dec!(2000)),
            loan("c", dec!(0.08), dec!(500)),
        ])
    }

    #[test]
    fn test_debt_in_front_basic() {
        let r = calculate_debt_in_front(&scenario_index(), rate(dec!(0.03)), None);
        assert_eq!(r.debt_in_front, dec!(1000));
        assert_eq!(r.total_debt, dec!(3500));
    }

    #[test]
    fn test_empty_snapshot() {
        let r = calculate_debt_in_front(&BracketIndex::default(), rate(dec!(0.05)), None);
        assert_eq!(r, DebtInFrontResult::default());
        assert_eq!(r.ratio(), None);
    }

    #[test]
    fn test_excluded_loan_below_query() {
        let excluded = ExcludedLoan {
            id: "a".into(),
            interest_rate: rate(dec!(0.01)),
            debt: dec!(1000),
        };
        let r = calculate_debt_in_front(&scenario_index(), rate(dec!(0.09)), Some(&excluded));
        assert_eq!(r.debt_in_front, dec!(2500));
        assert_eq!(r.total_debt, dec!(2500));
    }

    #[test]
    fn test_excluded_loan_in_query_bracket() {
        let excluded = ExcludedLoan {
            id: "b".into(),
            interest_rate: rate(dec!(0.03)),
            debt: dec!(2000),
        };
        let r = calculate_debt_in_front(&scenario_index(), rate(dec!(0.0305)), Some(&excluded));
        assert_eq!(r.debt_in_front, dec!(1000));
        assert_eq!(r.total_debt, dec!(1500));
    }

    #[test]
    fn test_excluded_loan_moving_up_does_not_count_itself() {
        // Loan b previews moving from 3% to 10%; its own 2000 must not sit in front.
        let excluded = ExcludedLoan {
            id: "b".into(),
            interest_rate: rate(dec!(0.03)),
            debt: dec!(2000),
        };
        let r = calculate_debt_in_front(&scenario_index(), rate(dec!(0.10)), Some(&excluded));
        assert_eq!(r.debt_in_front, dec!(1500));
        assert_eq!(r.total_debt, dec!(1500));
    }

    #[test]
    fn test_excluded_debt_capped_at_bracket() {
        let excluded = ExcludedLoan {
            id: "stale".into(),
            interest_rate: rate(dec!(0.01)),
            debt: dec!(5000),
        };
        let r = calculate_debt_in_front(&scenario_index(), rate(dec!(0.2)), Some(&excluded));
        assert_eq!(r.debt_in_front, dec!(2500));
        assert_eq!(r.total_debt, dec!(2500));
    }

    #[test]
    fn test_excluded_loan_in_empty_bracket_is_noop() {
        let excluded = ExcludedLoan {
            id: "new".into(),
            interest_rate: rate(dec!(0.15)),
            debt: dec!(700),
        };
        let r = calculate_debt_in_front(&scenario_index(), rate(dec!(0.2)), Some(&excluded));
        assert_eq!(r.debt_in_front, dec!(3500));
        assert_eq!(r.total_debt, dec!(3500));
    }

    #[test]
    fn test_unknown_id_in_populated_bracket_excludes_nothing() {
        let loans = [
            loan("a", dec!(0.01), dec!(1000)),
            loan("b", dec!(0.03), dec!(2000)),
            loan("c", dec!(0.08), dec!(500)),
        ];
        // "ghost" would name the 1% bracket that loan a populates
        let excluded = ExcludedLoan::find(&loans, "ghost", None);
        assert!(excluded.is_none());
        let r = calculate_debt_in_front(&scenario_index(), rate(dec!(0.09)), excluded.as_ref());
        assert_eq!(r.debt_in_front, dec!(3500));
        assert_eq!(r.total_debt, dec!(3500));
    }

    #[test]
    fn test_find_respects_branch() {
        let mut other_branch = loan("z", dec!(0.01), dec!(700));
        other_branch.branch_id = 1;
        let loans = [loan("a", dec!(0.01), dec!(1000)), other_branch];
        assert!(ExcludedLoan::find(&loans, "z", Some(0)).is_none());
        let found = ExcludedLoan::find(&loans, "z", Some(1)).unwrap();
        assert_eq!(found.debt, dec!(700));
        assert_eq!(found.interest_rate, rate(dec!(0.01)));
        assert!(ExcludedLoan::find(&loans, "z", None).is_some());
    }

    #[test]
    fn test_ratio() {
        let r = DebtInFrontResult {
            debt_in_front: dec!(25),
            total_debt: dec!(100),
        };
        assert_eq!(r.ratio(), Some(dec!(0.25)));
    }

    #[test]
    fn test_curve_is_monotonic() {
        let rates = [dec!(0.005), dec!(0.011), dec!(0.031), dec!(0.081), dec!(0.2)];
        let curve = debt_in_front_curve(&scenario_index(), &rates, None);
        let values: Vec<Decimal> = curve.iter().map(|(_, r)| r.debt_in_front).collect();
        assert_eq!(values, vec![dec!(0), dec!(1000), dec!(3000), dec!(3000), dec!(3500)]);
    }
}
