use napi::Result as NapiResult;
use napi_derive::napi;

use cdp_risk_core::redemption::brackets::{LoanRecord, RawLoanRecord};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Redemption
// ---------------------------------------------------------------------------

#[napi]
pub fn redemption_risk(input_json: String) -> NapiResult<String> {
    let input: cdp_risk_core::redemption::risk::RedemptionRiskInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = cdp_risk_core::redemption::risk::analyze_redemption_risk(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn bracket_distribution(input_json: String) -> NapiResult<String> {
    let input: cdp_risk_core::redemption::brackets::BracketDistributionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = cdp_risk_core::redemption::brackets::bracket_distribution(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Convert indexer loans (18-decimal integer strings) into decimal loan records.
#[napi]
pub fn normalize_loans(raw_json: String) -> NapiResult<String> {
    let raw: Vec<RawLoanRecord> = serde_json::from_str(&raw_json).map_err(to_napi_error)?;
    let loans = raw
        .into_iter()
        .map(LoanRecord::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_napi_error)?;
    serde_json::to_string(&loans).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

#[napi]
pub fn position_metrics(input_json: String) -> NapiResult<String> {
    let input: cdp_risk_core::position::metrics::PositionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        cdp_risk_core::position::metrics::analyze_position(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[napi]
pub fn tcr_check(input_json: String) -> NapiResult<String> {
    let input: cdp_risk_core::system::tcr::TcrQuery =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = cdp_risk_core::system::tcr::check_operation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Just the blocking message for a query, or null when the operation is allowed.
#[napi]
pub fn tcr_validation_message(input_json: String) -> NapiResult<Option<String>> {
    let input: cdp_risk_core::system::tcr::TcrQuery =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    Ok(cdp_risk_core::system::tcr::validation_message(&input))
}

// ---------------------------------------------------------------------------
// Incentives
// ---------------------------------------------------------------------------

#[napi]
pub fn rebate(input_json: String) -> NapiResult<String> {
    let input: cdp_risk_core::incentives::rebate::RebateInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        cdp_risk_core::incentives::rebate::calculate_rebate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
