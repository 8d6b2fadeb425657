use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AmortizationError;
use crate::time_value::{checked_product, checked_sum, settlement_tolerance};
use crate::types::{Money, PaymentFrequency, Rate};
use crate::EngineResult;

/// Share of the level payment a baseline walk may leave unpaid at its
/// scheduled last period and still settle there.
const FINAL_PERIOD_RESIDUE: Decimal = dec!(0.000000001);

/// Everything the period-by-period walk needs. The payment is supplied by
/// the caller, so a schedule can be built for a payment that did not come
/// from the solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Balance at the start of the walk.
    pub principal: Money,
    pub periodic_rate: Rate,
    /// Original term; bounds the walk at twice this many periods.
    pub total_periods: u32,
    /// Baseline scheduled payment per period.
    pub periodic_payment: Money,
    #[serde(default)]
    pub extra_payment: Money,
    /// Periods already paid before this walk begins; the first row is
    /// numbered `start_period_offset + 1`.
    #[serde(default)]
    pub start_period_offset: u32,
    /// Due date of period 1 of the loan (not of the first emitted row).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub frequency: PaymentFrequency,
}

/// One period of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub opening_balance: Money,
    pub total_payment: Money,
    pub interest_portion: Money,
    /// All principal retired this period, extra included.
    pub principal_portion: Money,
    /// Principal retired by the baseline payment alone.
    pub scheduled_principal: Money,
    pub extra_portion_applied: Money,
    pub remaining_balance: Money,
}

/// Walk the loan one period at a time until the balance reaches zero.
///
/// Each period charges `balance × rate` interest and applies
/// `periodic_payment + extra_payment`, except the last, which pays exactly
/// the balance plus its interest. A balance the payment would leave behind
/// that is only rounding residue is folded into that last payment, so a
/// baseline walk ends at exactly `total_periods`. Fails with `NonConvergingSchedule` when
/// the payment cannot cover the first period's interest, or when the walk
/// runs past twice the original term. No rows are returned on error.
pub fn generate_schedule(request: &ScheduleRequest) -> EngineResult<Vec<AmortizationRow>> {
    validate(request)?;

    if request.principal.is_zero() {
        return Ok(Vec::new());
    }

    let rate = request.periodic_rate;
    let scheduled_total = checked_sum(
        request.periodic_payment,
        request.extra_payment,
        "scheduled payment",
    )?;
    let bound = request.total_periods.saturating_mul(2);

    let first_interest = checked_product(request.principal, rate, "first-period interest")?;
    if scheduled_total <= first_interest {
        warn!(
            payment = %scheduled_total,
            interest = %first_interest,
            "payment does not cover first-period interest"
        );
        return Err(AmortizationError::NonConvergingSchedule {
            periods_walked: 0,
            bound,
            reason: format!(
                "payment of {scheduled_total} does not cover first-period interest of {first_interest}"
            ),
        });
    }

    let tolerance = settlement_tolerance(request.principal)?;
    // From the scheduled last period on, whatever the level payment leaves
    // behind is residue of rounding the payment itself.
    let final_tolerance = checked_product(
        request.periodic_payment,
        FINAL_PERIOD_RESIDUE,
        "final-period tolerance",
    )?
    .max(tolerance);

    let mut rows = Vec::with_capacity(request.total_periods as usize);
    let mut balance = request.principal;
    let mut period = request.start_period_offset;
    let mut walked: u32 = 0;

    while balance > Decimal::ZERO {
        if walked >= bound {
            warn!(walked, bound, balance = %balance, "schedule exceeded safety bound");
            return Err(AmortizationError::NonConvergingSchedule {
                periods_walked: walked,
                bound,
                reason: format!("balance of {balance} still outstanding"),
            });
        }
        walked += 1;
        period += 1;

        let opening = balance;
        let interest = checked_product(opening, rate, "period interest")?;
        let payoff = checked_sum(opening, interest, "period payoff")?;

        // Final period: pay off exactly, never past zero
        let shortfall = payoff - scheduled_total;
        let settles = if period >= request.total_periods {
            shortfall <= final_tolerance
        } else {
            shortfall <= tolerance
        };
        let (total_payment, principal_portion) = if settles {
            (payoff, opening)
        } else {
            (scheduled_total, scheduled_total - interest)
        };
        balance = opening - principal_portion;

        let extra_applied = (total_payment - request.periodic_payment)
            .max(Decimal::ZERO)
            .min(request.extra_payment);

        let payment_date = request
            .first_payment_date
            .and_then(|first| request.frequency.payment_date(first, period - 1));

        rows.push(AmortizationRow {
            period,
            payment_date,
            opening_balance: opening,
            total_payment,
            interest_portion: interest,
            principal_portion,
            scheduled_principal: principal_portion - extra_applied,
            extra_portion_applied: extra_applied,
            remaining_balance: balance,
        });
    }

    debug!(
        periods = rows.len(),
        offset = request.start_period_offset,
        "schedule generated"
    );
    Ok(rows)
}

fn validate(request: &ScheduleRequest) -> EngineResult<()> {
    if request.principal < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "principal",
            "Balance cannot be negative",
        ));
    }
    if request.periodic_rate < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "periodic_rate",
            "Periodic rate cannot be negative",
        ));
    }
    if request.total_periods == 0 {
        return Err(AmortizationError::invalid(
            "total_periods",
            "Number of periods must be > 0",
        ));
    }
    if request.periodic_payment < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "periodic_payment",
            "Payment cannot be negative",
        ));
    }
    if request.extra_payment < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "extra_payment",
            "Extra payment cannot be negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::compute_periodic_payment;
    use rust_decimal_macros::dec;

    fn request(principal: Money, rate: Rate, periods: u32) -> ScheduleRequest {
        let payment = compute_periodic_payment(principal, rate, periods).unwrap();
        ScheduleRequest {
            principal,
            periodic_rate: rate,
            total_periods: periods,
            periodic_payment: payment,
            extra_payment: Decimal::ZERO,
            start_period_offset: 0,
            first_payment_date: None,
            frequency: PaymentFrequency::Monthly,
        }
    }

    #[test]
    fn test_baseline_runs_full_term() {
        let rows = generate_schedule(&request(dec!(10000), dec!(0.01), 24)).unwrap();
        assert_eq!(rows.len(), 24);
        assert_eq!(rows.first().unwrap().period, 1);
        assert_eq!(rows.last().unwrap().period, 24);
        assert_eq!(rows.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_baseline_has_no_extra() {
        let rows = generate_schedule(&request(dec!(8000), dec!(0.0075), 36)).unwrap();
        assert!(rows.iter().all(|r| r.extra_portion_applied.is_zero()));
    }

    #[test]
    fn test_first_row_split() {
        let rows = generate_schedule(&request(dec!(1000), dec!(0.05), 4)).unwrap();
        let first = &rows[0];
        assert_eq!(first.opening_balance, dec!(1000));
        assert_eq!(first.interest_portion, dec!(50));
        let gap = first.interest_portion + first.principal_portion - first.total_payment;
        assert!(gap.abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_extra_payment_shortens_and_clamps_final_period() {
        let mut req = request(dec!(5000), dec!(0.01), 24);
        req.extra_payment = dec!(200);
        let rows = generate_schedule(&req).unwrap();
        assert!(rows.len() < 24);

        let last = rows.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO);
        assert_eq!(last.total_payment, last.opening_balance + last.interest_portion);
        assert!(last.total_payment <= req.periodic_payment + req.extra_payment);

        for row in &rows {
            let parts =
                row.interest_portion + row.scheduled_principal + row.extra_portion_applied;
            assert!((parts - row.total_payment).abs() < dec!(0.0000000001));
        }
    }

    #[test]
    fn test_offset_numbers_rows_from_offset() {
        let mut req = request(dec!(3000), dec!(0.01), 12);
        req.start_period_offset = 6;
        req.first_payment_date = NaiveDate::from_ymd_opt(2025, 1, 15);
        let rows = generate_schedule(&req).unwrap();
        assert_eq!(rows[0].period, 7);
        assert_eq!(rows[0].payment_date, NaiveDate::from_ymd_opt(2025, 7, 15));
    }

    #[test]
    fn test_zero_balance_yields_empty_schedule() {
        let mut req = request(dec!(1000), dec!(0.01), 12);
        req.principal = Decimal::ZERO;
        assert!(generate_schedule(&req).unwrap().is_empty());
    }

    #[test]
    fn test_payment_equal_to_interest_does_not_converge() {
        let mut req = request(dec!(1000), dec!(0.01), 12);
        req.periodic_payment = dec!(10);
        let err = generate_schedule(&req).unwrap_err();
        assert!(err.is_non_converging());
    }

    #[test]
    fn test_zero_payment_at_zero_rate_does_not_converge() {
        let mut req = request(dec!(1000), Decimal::ZERO, 12);
        req.periodic_payment = Decimal::ZERO;
        assert!(generate_schedule(&req).unwrap_err().is_non_converging());
    }

    #[test]
    fn test_slow_payment_hits_safety_bound() {
        // Covers interest, but would need far more than 2 × 12 periods
        let mut req = request(dec!(1000), dec!(0.01), 12);
        req.periodic_payment = dec!(10.5);
        match generate_schedule(&req) {
            Err(AmortizationError::NonConvergingSchedule {
                periods_walked,
                bound,
                ..
            }) => {
                assert_eq!(bound, 24);
                assert_eq!(periods_walked, 24);
            }
            other => panic!("expected non-convergence, got {other:?}"),
        }
    }

    #[test]
    fn test_large_principal_baseline_ends_on_term() {
        for principal in [dec!(1000000000000000), dec!(1000000000000000000000)] {
            let rows = generate_schedule(&request(principal, dec!(0.0123), 480)).unwrap();
            assert_eq!(rows.len(), 480, "principal {principal}");
            let last = rows.last().unwrap();
            assert_eq!(last.period, 480);
            assert_eq!(last.remaining_balance, Decimal::ZERO);
            assert_eq!(last.total_payment, last.opening_balance + last.interest_portion);
            assert!(rows.iter().all(|r| r.extra_portion_applied.is_zero()));
        }
    }

    #[test]
    fn test_overflowing_payment_is_non_finite() {
        let mut req = request(dec!(70000000000000000000000000000), Decimal::ZERO, 1);
        req.extra_payment = dec!(70000000000000000000000000000);
        assert!(matches!(
            generate_schedule(&req),
            Err(AmortizationError::NonFiniteResult { .. })
        ));
    }

    #[test]
    fn test_negative_extra_is_invalid() {
        let mut req = request(dec!(1000), dec!(0.01), 12);
        req.extra_payment = dec!(-1);
        assert!(matches!(
            generate_schedule(&req),
            Err(AmortizationError::InvalidInput { .. })
        ));
    }
}
