use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpRiskError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Interest rate {rate} is outside the supported range [0.005, 0.20]")]
    InterestRateOutOfRange { rate: Decimal },

    #[error("Fixed-point overflow: {value} does not fit in a decimal with {decimals} places")]
    FixedPointOverflow { value: String, decimals: u32 },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CdpRiskError {
    fn from(e: serde_json::Error) -> Self {
        CdpRiskError::SerializationError(e.to_string())
    }
}
