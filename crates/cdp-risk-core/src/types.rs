use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values and token amounts. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Collateral-to-debt ratios (1.5 = 150%).
pub type Ratio = Decimal;

/// Values already multiplied by 100 (66.67 = 66.67%).
pub type Percent = Decimal;

/// Discrete risk tier shared by redemption and liquidation classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        write!(f, "{}", s)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

pub(crate) fn require_non_negative(
    value: Decimal,
    field: &str,
) -> crate::CdpRiskResult<()> {
    if value < Decimal::ZERO {
        return Err(crate::CdpRiskError::InvalidInput {
            field: field.into(),
            reason: "Value cannot be negative.".into(),
        });
    }
    Ok(())
}

pub(crate) fn require_positive(value: Decimal, field: &str) -> crate::CdpRiskResult<()> {
    if value <= Decimal::ZERO {
        return Err(crate::CdpRiskError::InvalidInput {
            field: field.into(),
            reason: "Value must be positive.".into(),
        });
    }
    Ok(())
}

/// `a * b / c` without panicking. Divides first when the product alone would
/// overflow; `None` when the quotient itself is out of range or `c` is zero.
pub(crate) fn checked_mul_div(a: Decimal, b: Decimal, c: Decimal) -> Option<Decimal> {
    a.checked_mul(b)
        .and_then(|product| product.checked_div(c))
        .or_else(|| a.checked_div(c).and_then(|quotient| quotient.checked_mul(b)))
}

pub(crate) fn overflow(context: &str) -> crate::CdpRiskError {
    crate::CdpRiskError::ArithmeticOverflow {
        context: context.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checked_mul_div_divides_first_on_large_product() {
        // 1e20 * 1e10 overflows on its own, the result 1e20 does not
        let a = dec!(100_000_000_000_000_000_000);
        assert_eq!(
            checked_mul_div(a, dec!(10_000_000_000), dec!(10_000_000_000)),
            Some(a)
        );
    }

    #[test]
    fn test_checked_mul_div_out_of_range() {
        let dust = dec!(0.000000000000000001);
        assert_eq!(checked_mul_div(dec!(100_000_000_000), dec!(1.1), dust), None);
        assert_eq!(checked_mul_div(dec!(1), dec!(1), Decimal::ZERO), None);
    }
}
