pub mod config;
pub mod error;
pub mod fixed_point;
pub mod types;

#[cfg(feature = "redemption")]
pub mod redemption;

#[cfg(feature = "position")]
pub mod position;

#[cfg(feature = "system")]
pub mod system;

#[cfg(feature = "incentives")]
pub mod incentives;

pub use error::CdpRiskError;
pub use types::*;

/// Standard result type for all cdp-risk operations
pub type CdpRiskResult<T> = Result<T, CdpRiskError>;
