use cdp_risk_core::incentives::rebate::{calculate_rebate, calculate_rebate_result, RebateInput};
use cdp_risk_core::system::tcr::{
    check_operation, resulting_tcr, validation_message, would_violate, Tcr, TcrQuery,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn branch_query() -> TcrQuery {
    TcrQuery {
        current_total_collateral: dec!(100),
        current_total_debt: dec!(2_000_000),
        collateral_price: dec!(30000),
        ccr: dec!(1.5),
        collateral_change: dec!(0),
        debt_change: dec!(0),
    }
}

// ===========================================================================
// TCR validator
// ===========================================================================

#[test]
fn test_borrow_pushes_branch_below_ccr() {
    let q = TcrQuery {
        debt_change: dec!(500_000),
        ..branch_query()
    };
    assert_eq!(resulting_tcr(&q), Some(Tcr::Finite(dec!(1.2))));
    assert!(would_violate(&q));
    assert_eq!(
        validation_message(&q).unwrap(),
        "This operation would bring the TCR to 120.0% (below the 150% critical threshold) and trigger Recovery Mode restrictions"
    );
}

#[test]
fn test_repaying_all_debt_is_infinite() {
    let q = TcrQuery {
        debt_change: dec!(-2_000_000),
        ..branch_query()
    };
    assert_eq!(resulting_tcr(&q), Some(Tcr::Infinite));
    assert!(!would_violate(&q));
    assert_eq!(validation_message(&q), None);
}

#[test]
fn test_zero_debt_with_zero_collateral_is_infinite() {
    let q = TcrQuery {
        collateral_change: dec!(-100),
        debt_change: dec!(-2_000_000),
        ..branch_query()
    };
    assert_eq!(resulting_tcr(&q), Some(Tcr::Infinite));
}

#[test]
fn test_over_withdrawal_is_invalid() {
    let q = TcrQuery {
        collateral_change: dec!(-150),
        ..branch_query()
    };
    assert_eq!(resulting_tcr(&q), None);
    assert!(would_violate(&q));
    assert_eq!(validation_message(&q).as_deref(), Some("Invalid operation"));
}

#[test]
fn test_message_rounding() {
    // 101 * 30000 / 2_100_000 = 1.442857... => 144.3%
    let q = TcrQuery {
        collateral_change: dec!(1),
        debt_change: dec!(100_000),
        ccr: dec!(1.505),
        ..branch_query()
    };
    let msg = validation_message(&q).unwrap();
    assert!(msg.contains("144.3%"), "{msg}");
    // 150.5% rounds half away from zero
    assert!(msg.contains("151%"), "{msg}");
}

#[test]
fn test_check_operation_envelope() {
    let q = TcrQuery {
        collateral_change: dec!(20),
        debt_change: dec!(100_000),
        ..branch_query()
    };
    let out = check_operation(&q).unwrap();
    assert_eq!(out.result.current_tcr, Tcr::Finite(dec!(1.5)));
    assert!(!out.result.in_recovery_mode);
    assert_eq!(out.result.new_debt, dec!(2_100_000));
    assert!(!out.result.would_violate);
    assert_eq!(out.result.message, None);
    let json = serde_json::to_value(&out.result).unwrap();
    assert!(json["current_tcr"].is_string());
}

// ===========================================================================
// Rebate
// ===========================================================================

#[test]
fn test_rebate_scenario() {
    let r = calculate_rebate_result(dec!(10000), dec!(10), dec!(0.4)).unwrap();
    assert_eq!(r.effective_rate, dec!(6));
    assert_eq!(r.yearly_interest, dec!(1000));
    assert_eq!(r.effective_yearly_interest, dec!(600));
    assert_eq!(r.yearly_rebate, dec!(400));
}

#[test]
fn test_rebate_envelope_from_json() {
    let input: RebateInput = serde_json::from_str(
        r#"{"borrow_amount": "25000", "interest_rate_percent": "4.5", "rebate_rate": "0.25"}"#,
    )
    .unwrap();
    let out = calculate_rebate(&input).unwrap();
    assert_eq!(out.result.rebate_percentage, dec!(25));
    assert_eq!(out.result.effective_rate, dec!(3.375));
    assert_eq!(out.result.yearly_interest, dec!(1125));
    assert_eq!(out.result.yearly_rebate, dec!(281.25));
}
