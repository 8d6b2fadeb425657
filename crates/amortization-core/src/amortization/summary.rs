use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::AmortizationRow;
use crate::time_value::checked_sum;
use crate::types::{Money, PaymentFrequency};
use crate::EngineResult;

/// Totals derived from a finished schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub periodic_payment: Money,
    /// Rows produced by the walk.
    pub actual_periods_to_payoff: u32,
    /// Loan period in which the balance reaches zero.
    pub payoff_period: u32,
    pub total_interest_paid: Money,
    pub total_principal_paid: Money,
    pub total_extra_paid: Money,
    pub total_paid: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
}

/// What an accelerated schedule saves against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffComparison {
    pub interest_saved: Money,
    pub term_reduced_periods: i64,
}

/// One calendar year of a schedule, for charting balance over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: u32,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub extra_paid: Money,
    pub closing_balance: Money,
}

/// Totals over `rows`; fails with NonFiniteResult when a total leaves
/// Decimal range.
pub fn summarize(
    periodic_payment: Money,
    rows: &[AmortizationRow],
    start_period_offset: u32,
) -> EngineResult<AmortizationSummary> {
    let mut total_interest_paid = Decimal::ZERO;
    let mut total_principal_paid = Decimal::ZERO;
    let mut total_extra_paid = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    for row in rows {
        total_interest_paid =
            checked_sum(total_interest_paid, row.interest_portion, "total interest paid")?;
        total_principal_paid =
            checked_sum(total_principal_paid, row.principal_portion, "total principal paid")?;
        total_extra_paid =
            checked_sum(total_extra_paid, row.extra_portion_applied, "total extra paid")?;
        total_paid = checked_sum(total_paid, row.total_payment, "total paid")?;
    }

    let last = rows.last();
    Ok(AmortizationSummary {
        periodic_payment,
        actual_periods_to_payoff: rows.len() as u32,
        payoff_period: last.map_or(start_period_offset, |r| r.period),
        total_interest_paid,
        total_principal_paid,
        total_extra_paid,
        total_paid,
        payoff_date: last.and_then(|r| r.payment_date),
    })
}

/// Compare an accelerated schedule against the original one.
///
/// Both summaries are taken as-is; comparing a schedule with itself gives
/// zero savings rather than an error.
pub fn compare_to_baseline(
    baseline: &AmortizationSummary,
    accelerated: &AmortizationSummary,
) -> PayoffComparison {
    PayoffComparison {
        interest_saved: baseline.total_interest_paid - accelerated.total_interest_paid,
        term_reduced_periods: i64::from(baseline.actual_periods_to_payoff)
            - i64::from(accelerated.actual_periods_to_payoff),
    }
}

/// Roll rows up into loan years (periods 1..=k belong to year 1, and so on,
/// where k is the number of periods per year).
pub fn annual_summaries(
    rows: &[AmortizationRow],
    frequency: PaymentFrequency,
) -> EngineResult<Vec<AnnualSummary>> {
    let per_year = frequency.periods_per_year();
    let mut years: Vec<AnnualSummary> = Vec::new();

    for row in rows {
        let year = row.period.div_ceil(per_year);
        match years.last_mut() {
            Some(current) if current.year == year => {
                current.interest_paid =
                    checked_sum(current.interest_paid, row.interest_portion, "annual interest")?;
                current.principal_paid =
                    checked_sum(current.principal_paid, row.principal_portion, "annual principal")?;
                current.extra_paid =
                    checked_sum(current.extra_paid, row.extra_portion_applied, "annual extra")?;
                current.closing_balance = row.remaining_balance;
            }
            _ => years.push(AnnualSummary {
                year,
                interest_paid: row.interest_portion,
                principal_paid: row.principal_portion,
                extra_paid: row.extra_portion_applied,
                closing_balance: row.remaining_balance,
            }),
        }
    }

    Ok(years)
}
