use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::schedule::{generate_schedule, AmortizationRow, ScheduleRequest};
use super::summary::{annual_summaries, compare_to_baseline, summarize};
use super::summary::{AmortizationSummary, AnnualSummary, PayoffComparison};
use crate::error::AmortizationError;
use crate::time_value::{checked_product, compute_periodic_payment, remaining_balance};
use crate::types::*;
use crate::EngineResult;

/// A loan expressed per payment period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    pub periodic_rate: Rate,
    pub total_periods: u32,
    #[serde(default)]
    pub extra_payment: Money,
    /// Payments already made under the original schedule before the extra
    /// payment starts.
    #[serde(default)]
    pub periods_already_elapsed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub frequency: PaymentFrequency,
}

/// A loan expressed the way a borrower quotes it: annual rate and years.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Nominal annual rate as a decimal (0.08 = 8%).
    pub annual_rate: Rate,
    pub term_years: u32,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default)]
    pub extra_payment: Money,
    #[serde(default)]
    pub periods_already_elapsed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

impl LoanTerms {
    pub fn to_parameters(&self) -> EngineResult<LoanParameters> {
        let per_year = self.frequency.periods_per_year();
        let total_periods = self.term_years.checked_mul(per_year).ok_or_else(|| {
            AmortizationError::invalid("term_years", "Term is too long to schedule")
        })?;
        Ok(LoanParameters {
            principal: self.principal,
            periodic_rate: self.annual_rate / Decimal::from(per_year),
            total_periods,
            extra_payment: self.extra_payment,
            periods_already_elapsed: self.periods_already_elapsed,
            first_payment_date: self.first_payment_date,
            frequency: self.frequency,
        })
    }
}

/// Full result of amortizing a loan with optional extra payments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    /// Balance when the walk starts, after any elapsed periods.
    pub opening_balance: Money,
    pub interest_paid_to_date: Money,
    pub schedule: Vec<AmortizationRow>,
    pub summary: AmortizationSummary,
    /// The original schedule: full term, no extra payments.
    pub baseline: AmortizationSummary,
    pub comparison: PayoffComparison,
    pub annual: Vec<AnnualSummary>,
}

/// Amortize a loan, continuing from any elapsed periods with the extra
/// payment applied, and measure the result against the original schedule.
pub fn amortize(params: &LoanParameters) -> EngineResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if params.extra_payment < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "extra_payment",
            "Extra payment cannot be negative",
        ));
    }

    let payment =
        compute_periodic_payment(params.principal, params.periodic_rate, params.total_periods)?;

    let baseline_rows = generate_schedule(&ScheduleRequest {
        principal: params.principal,
        periodic_rate: params.periodic_rate,
        total_periods: params.total_periods,
        periodic_payment: payment,
        extra_payment: Decimal::ZERO,
        start_period_offset: 0,
        first_payment_date: params.first_payment_date,
        frequency: params.frequency,
    })?;
    let baseline = summarize(payment, &baseline_rows, 0)?;

    let elapsed = params.periods_already_elapsed;
    let opening_balance = remaining_balance(
        params.principal,
        params.periodic_rate,
        params.total_periods,
        elapsed,
    )?;
    let interest_paid_to_date = if elapsed == 0 {
        Decimal::ZERO
    } else {
        let paid = checked_product(payment, Decimal::from(elapsed), "payments to date")?;
        (paid - (params.principal - opening_balance)).max(Decimal::ZERO)
    };

    if opening_balance.is_zero() {
        warnings.push(format!(
            "All {} periods already elapsed; loan is repaid",
            params.total_periods
        ));
    }
    if params.extra_payment.is_zero() {
        warnings.push("No extra payment; schedule follows the original term".into());
    }

    let schedule = generate_schedule(&ScheduleRequest {
        principal: opening_balance,
        periodic_rate: params.periodic_rate,
        total_periods: params.total_periods,
        periodic_payment: payment,
        extra_payment: params.extra_payment,
        start_period_offset: elapsed,
        first_payment_date: params.first_payment_date,
        frequency: params.frequency,
    })?;
    let summary = summarize(payment, &schedule, elapsed)?;

    // Savings count the interest already paid and the periods already
    // elapsed as part of the accelerated path.
    let mut comparison = compare_to_baseline(&baseline, &summary);
    comparison.interest_saved -= interest_paid_to_date;
    comparison.term_reduced_periods -= i64::from(elapsed);

    let annual = annual_summaries(&schedule, params.frequency)?;

    debug!(
        periods = params.total_periods,
        elapsed,
        payoff_period = summary.payoff_period,
        "loan amortized"
    );

    let output = AmortizationOutput {
        opening_balance,
        interest_paid_to_date,
        schedule,
        summary,
        baseline,
        comparison,
        annual,
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization with extra principal payments",
        &serde_json::json!({
            "principal": params.principal.to_string(),
            "periodic_rate": params.periodic_rate.to_string(),
            "total_periods": params.total_periods,
            "extra_payment": params.extra_payment.to_string(),
            "periods_already_elapsed": elapsed,
        }),
        warnings,
        elapsed_us,
        output,
    ))
}
