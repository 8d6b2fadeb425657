use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::AmortizationError;
use crate::types::{Money, Rate};
use crate::EngineResult;

/// Balances at or below this are treated as fully repaid. Decimal keeps 28
/// significant digits, so anything this small is rounding residue.
const SETTLEMENT_DUST: Decimal = dec!(0.000000000001);

/// Residue as a share of the principal. On large loans the 28 digits run
/// out above the decimal point, so the absolute dust alone is too tight.
const RELATIVE_DUST: Decimal = dec!(0.0000000000000000001);

/// Largest balance still treated as rounding residue for a loan of `principal`.
pub(crate) fn settlement_tolerance(principal: Money) -> EngineResult<Money> {
    let scaled = checked_product(principal, RELATIVE_DUST, "settlement tolerance")?;
    Ok(scaled.max(SETTLEMENT_DUST))
}

/// `a + b`, or NonFiniteResult naming `context` when the sum leaves Decimal range.
pub(crate) fn checked_sum(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| AmortizationError::non_finite(context))
}

/// `a × b`, or NonFiniteResult naming `context` when the product leaves Decimal range.
pub(crate) fn checked_product(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| AmortizationError::non_finite(context))
}

fn validate_loan(principal: Money, periodic_rate: Rate, total_periods: u32) -> EngineResult<()> {
    if principal <= Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if periodic_rate < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "periodic_rate",
            "Periodic rate cannot be negative",
        ));
    }
    if total_periods == 0 {
        return Err(AmortizationError::invalid(
            "total_periods",
            "Number of periods must be > 0",
        ));
    }
    Ok(())
}

/// (1 + r)^n, or NonFiniteResult when it leaves Decimal range.
fn growth_factor(periodic_rate: Rate, periods: u32) -> EngineResult<Decimal> {
    let one_plus_r = Decimal::ONE
        .checked_add(periodic_rate)
        .ok_or_else(|| AmortizationError::non_finite("growth factor base"))?;
    one_plus_r
        .checked_powu(u64::from(periods))
        .ok_or_else(|| AmortizationError::non_finite(format!("(1 + rate)^{periods}")))
}

/// Fixed payment that fully amortises `principal` over `total_periods`.
///
/// Annuity-immediate: `P × r × (1+r)^n / ((1+r)^n − 1)`. A zero rate falls
/// back to straight-line `P / n`.
pub fn compute_periodic_payment(
    principal: Money,
    periodic_rate: Rate,
    total_periods: u32,
) -> EngineResult<Money> {
    validate_loan(principal, periodic_rate, total_periods)?;

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(total_periods));
    }

    let factor = growth_factor(periodic_rate, total_periods)?;
    let denominator = factor - Decimal::ONE;
    if denominator <= Decimal::ZERO {
        // Rate too small to move (1+r)^n at 28 digits of precision.
        return Err(AmortizationError::non_finite("annuity factor denominator"));
    }

    let payment = principal
        .checked_mul(periodic_rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| AmortizationError::non_finite("periodic payment"))?;

    if payment <= Decimal::ZERO {
        return Err(AmortizationError::non_finite("periodic payment"));
    }
    Ok(payment)
}

/// Outstanding balance after `periods_paid` scheduled payments.
///
/// Closed form `P × ((1+r)^n − (1+r)^p) / ((1+r)^n − 1)`; straight-line at
/// a zero rate.
pub fn remaining_balance(
    principal: Money,
    periodic_rate: Rate,
    total_periods: u32,
    periods_paid: u32,
) -> EngineResult<Money> {
    validate_loan(principal, periodic_rate, total_periods)?;
    if periods_paid > total_periods {
        return Err(AmortizationError::invalid(
            "periods_already_elapsed",
            format!("{periods_paid} periods paid exceeds the {total_periods}-period term"),
        ));
    }
    if periods_paid == 0 {
        return Ok(principal);
    }

    let balance = if periodic_rate.is_zero() {
        let payment = principal / Decimal::from(total_periods);
        principal - payment * Decimal::from(periods_paid)
    } else {
        let full = growth_factor(periodic_rate, total_periods)?;
        let paid = growth_factor(periodic_rate, periods_paid)?;
        let denominator = full - Decimal::ONE;
        if denominator <= Decimal::ZERO {
            return Err(AmortizationError::non_finite("remaining balance denominator"));
        }
        principal
            .checked_mul(full - paid)
            .and_then(|v| v.checked_div(denominator))
            .ok_or_else(|| AmortizationError::non_finite("remaining balance"))?
    };

    if balance <= settlement_tolerance(principal)? {
        Ok(Decimal::ZERO)
    } else {
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_five_year_car_loan() {
        let pmt = compute_periodic_payment(dec!(10000), dec!(0.08) / dec!(12), 60).unwrap();
        // 10,000 at 8% over 60 months ≈ 202.76
        assert!((pmt - dec!(202.76)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_payment_thirty_year_mortgage() {
        let pmt = compute_periodic_payment(dec!(250000), dec!(0.05) / dec!(12), 360).unwrap();
        assert!((pmt - dec!(1342.05)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_payment_zero_rate_is_straight_line() {
        let pmt = compute_periodic_payment(dec!(1200), Decimal::ZERO, 12).unwrap();
        assert_eq!(pmt, dec!(100));
    }

    #[test]
    fn test_payment_rejects_bad_inputs() {
        assert!(matches!(
            compute_periodic_payment(Decimal::ZERO, dec!(0.01), 12),
            Err(AmortizationError::InvalidInput { .. })
        ));
        assert!(matches!(
            compute_periodic_payment(dec!(100), dec!(-0.01), 12),
            Err(AmortizationError::InvalidInput { .. })
        ));
        assert!(matches!(
            compute_periodic_payment(dec!(100), dec!(0.01), 0),
            Err(AmortizationError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_payment_overflow_is_non_finite() {
        // 2^200 is far outside Decimal range
        let result = compute_periodic_payment(dec!(1000), Decimal::ONE, 200);
        assert!(matches!(
            result,
            Err(AmortizationError::NonFiniteResult { .. })
        ));
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        let r = dec!(0.005);
        assert_eq!(remaining_balance(dec!(5000), r, 24, 0).unwrap(), dec!(5000));
        assert_eq!(remaining_balance(dec!(5000), r, 24, 24).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_remaining_balance_zero_rate() {
        let bal = remaining_balance(dec!(1200), Decimal::ZERO, 12, 5).unwrap();
        assert_eq!(bal, dec!(700));
    }

    #[test]
    fn test_settlement_tolerance_scales_with_principal() {
        assert_eq!(settlement_tolerance(dec!(10000)).unwrap(), SETTLEMENT_DUST);
        assert_eq!(settlement_tolerance(dec!(1000000000000000000000)).unwrap(), dec!(100));
    }

    #[test]
    fn test_checked_sum_overflow_is_non_finite() {
        assert!(matches!(
            checked_sum(Decimal::MAX, Decimal::ONE, "total"),
            Err(AmortizationError::NonFiniteResult { .. })
        ));
        assert!(matches!(
            checked_product(Decimal::MAX, dec!(2), "total"),
            Err(AmortizationError::NonFiniteResult { .. })
        ));
    }

    #[test]
    fn test_remaining_balance_past_term_is_invalid() {
        assert!(remaining_balance(dec!(1000), dec!(0.01), 12, 13).is_err());
    }
}
