use napi::{Result as NapiResult, Status};
use napi_derive::napi;
use rust_decimal::Decimal;

use amortization_core::AmortizationError;

/// Engine errors keep their kind as a `code: message` reason so the UI can
/// show "payment too low to cover interest" apart from bad input.
fn to_engine_error(e: AmortizationError) -> napi::Error {
    let status = match e {
        AmortizationError::InvalidInput { .. } => Status::InvalidArg,
        _ => Status::GenericFailure,
    };
    napi::Error::new(status, format!("{}: {}", e.code(), e))
}

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::new(Status::InvalidArg, e.to_string())
}

fn parse_decimal(field: &str, value: &str) -> NapiResult<Decimal> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|e| to_napi_error(format!("{field}: {e}")))
}

// ---------------------------------------------------------------------------
// Amortization engine
// ---------------------------------------------------------------------------

/// Fixed periodic payment; amounts are decimal strings to keep precision.
#[napi]
pub fn compute_periodic_payment(
    principal: String,
    periodic_rate: String,
    total_periods: u32,
) -> NapiResult<String> {
    let principal = parse_decimal("principal", &principal)?;
    let rate = parse_decimal("periodic_rate", &periodic_rate)?;
    let payment = amortization_core::time_value::compute_periodic_payment(principal, rate, total_periods)
        .map_err(to_engine_error)?;
    Ok(payment.to_string())
}

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: amortization_core::amortization::ScheduleRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rows =
        amortization_core::amortization::generate_schedule(&input).map_err(to_engine_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let input: amortization_core::amortization::LoanParameters =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization_core::amortization::amortize(&input).map_err(to_engine_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortize_terms(input_json: String) -> NapiResult<String> {
    let terms: amortization_core::amortization::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let params = terms.to_parameters().map_err(to_engine_error)?;
    let output = amortization_core::amortization::amortize(&params).map_err(to_engine_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_to_baseline(baseline_json: String, accelerated_json: String) -> NapiResult<String> {
    let baseline: amortization_core::amortization::AmortizationSummary =
        serde_json::from_str(&baseline_json).map_err(to_napi_error)?;
    let accelerated: amortization_core::amortization::AmortizationSummary =
        serde_json::from_str(&accelerated_json).map_err(to_napi_error)?;
    let comparison = amortization_core::amortization::compare_to_baseline(&baseline, &accelerated);
    serde_json::to_string(&comparison).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Lending calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_mortgage(input_json: String) -> NapiResult<String> {
    let input: amortization_core::mortgage::payment::MortgageInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization_core::mortgage::payment::analyze_mortgage(&input)
        .map_err(to_engine_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_consolidation(input_json: String) -> NapiResult<String> {
    let input: amortization_core::consolidation::estimator::ConsolidationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization_core::consolidation::estimator::analyze_consolidation(&input)
        .map_err(to_engine_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
