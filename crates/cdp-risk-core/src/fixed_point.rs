//! Conversion between on-chain fixed-point integers and `Decimal`.
//!
//! Ledger values (debts, rates, prices) arrive as base-unit integers scaled by
//! `10^18`. `rust_decimal` holds 28 significant digits, so an 18-decimal value
//! keeps full precision up to roughly 7.9e10 whole units.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{CdpRiskError, CdpRiskResult};

/// Decimal places used by the ledger for debts, rates and prices.
pub const ONCHAIN_DECIMALS: u32 = 18;

/// Parse a base-unit integer string (e.g. `"1500000000000000000"`) into a
/// decimal with `decimals` fractional places.
pub fn from_fixed(raw: &str, decimals: u32) -> CdpRiskResult<Decimal> {
    let trimmed = raw.trim();
    let mantissa: i128 = trimmed.parse().map_err(|_| CdpRiskError::InvalidInput {
        field: "fixed_point".into(),
        reason: format!("'{trimmed}' is not an integer"),
    })?;
    Decimal::try_from_i128_with_scale(mantissa, decimals)
        .map(|d| d.normalize())
        .map_err(|_| CdpRiskError::FixedPointOverflow {
            value: trimmed.to_string(),
            decimals,
        })
}

/// Render a decimal as a base-unit integer string. Digits beyond `decimals`
/// places are truncated toward zero.
pub fn to_fixed(value: Decimal, decimals: u32) -> CdpRiskResult<String> {
    let mut scaled = value.round_dp_with_strategy(decimals, RoundingStrategy::ToZero);
    scaled.rescale(decimals);
    if scaled.scale() != decimals {
        return Err(CdpRiskError::FixedPointOverflow {
            value: value.to_string(),
            decimals,
        });
    }
    Ok(scaled.mantissa().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_fixed_whole_units() {
        let d = from_fixed("1500000000000000000", ONCHAIN_DECIMALS).unwrap();
        assert_eq!(d, dec!(1.5));
    }

    #[test]
    fn test_from_fixed_rate() {
        // 5% annual rate as stored on-chain
        let d = from_fixed("50000000000000000", ONCHAIN_DECIMALS).unwrap();
        assert_eq!(d, dec!(0.05));
    }

    #[test]
    fn test_from_fixed_rejects_garbage() {
        let err = from_fixed("12abc", ONCHAIN_DECIMALS).unwrap_err();
        match err {
            CdpRiskError::InvalidInput { field, .. } => assert_eq!(field, "fixed_point"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_from_fixed_rejects_scale_overflow() {
        assert!(matches!(
            from_fixed("1", 29),
            Err(CdpRiskError::FixedPointOverflow { .. })
        ));
    }

    #[test]
    fn test_to_fixed_truncates_extra_places() {
        let s = to_fixed(dec!(2.0000000000000000019), ONCHAIN_DECIMALS).unwrap();
        assert_eq!(s, "2000000000000000001");
    }

    #[test]
    fn test_to_fixed_debt_value() {
        let s = to_fixed(dec!(20000), ONCHAIN_DECIMALS).unwrap();
        assert_eq!(s, "20000000000000000000000");
    }

    #[test]
    fn test_to_fixed_overflow() {
        // 10^12 whole units needs 31 digits at 18 places
        let err = to_fixed(dec!(1_000_000_000_000), ONCHAIN_DECIMALS).unwrap_err();
        assert!(matches!(err, CdpRiskError::FixedPointOverflow { .. }));
    }
}
