//! Home mortgage payment breakdown: principal and interest, property tax,
//! homeowner's insurance, HOA dues and private mortgage insurance, with an
//! optional accelerated-payoff comparison for a monthly extra payment.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{amortize, LoanParameters, PayoffComparison};
use crate::error::AmortizationError;
use crate::time_value::{checked_product, checked_sum};
use crate::types::{with_metadata, ComputationOutput, Money, PaymentFrequency, Rate};
use crate::EngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Down payments below this share of the price carry PMI.
const PMI_EQUITY_THRESHOLD: Decimal = dec!(0.20);

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub property_price: Money,
    pub down_payment: Money,
    /// Annual mortgage rate (e.g., 0.065 = 6.5%).
    pub annual_rate: Rate,
    pub term_years: u32,
    #[serde(default)]
    pub annual_property_tax: Money,
    #[serde(default)]
    pub annual_insurance: Money,
    #[serde(default)]
    pub monthly_hoa: Money,
    /// Annual PMI premium as a share of the loan (e.g., 0.005 = 0.5%).
    #[serde(default)]
    pub annual_pmi_rate: Rate,
    /// Extra principal paid every month.
    #[serde(default)]
    pub extra_payment: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

/// Payoff under the extra monthly payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceleratedPayoff {
    pub extra_payment: Money,
    pub payoff_period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub total_interest: Money,
    pub years_shorter: Decimal,
    #[serde(flatten)]
    pub comparison: PayoffComparison,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub loan_amount: Money,
    pub down_payment_pct: Rate,
    pub monthly_principal_interest: Money,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub monthly_hoa: Money,
    pub monthly_pmi: Money,
    pub total_monthly_payment: Money,
    pub total_interest: Money,
    /// Everything paid over the full term, down payment included.
    pub total_cost: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accelerated: Option<AcceleratedPayoff>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

pub fn analyze_mortgage(input: &MortgageInput) -> EngineResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let loan_amount = input.property_price - input.down_payment;
    let down_payment_pct = input.down_payment / input.property_price;

    let params = LoanParameters {
        principal: loan_amount,
        periodic_rate: input.annual_rate / MONTHS_PER_YEAR,
        total_periods: input.term_years * 12,
        extra_payment: input.extra_payment,
        periods_already_elapsed: 0,
        first_payment_date: input.first_payment_date,
        frequency: PaymentFrequency::Monthly,
    };
    let amortized = amortize(&params)?.result;
    let baseline = &amortized.baseline;
    let monthly_pi = baseline.periodic_payment;

    let monthly_pmi = if down_payment_pct < PMI_EQUITY_THRESHOLD {
        if input.annual_pmi_rate.is_zero() {
            warnings.push(format!(
                "Down payment is {}% of price but no PMI rate was given",
                (down_payment_pct * dec!(100)).round_dp(2)
            ));
        }
        checked_product(loan_amount, input.annual_pmi_rate, "annual PMI")? / MONTHS_PER_YEAR
    } else {
        Decimal::ZERO
    };

    let monthly_property_tax = input.annual_property_tax / MONTHS_PER_YEAR;
    let monthly_insurance = input.annual_insurance / MONTHS_PER_YEAR;
    let total_monthly_payment = [
        monthly_property_tax,
        monthly_insurance,
        input.monthly_hoa,
        monthly_pmi,
    ]
    .into_iter()
    .try_fold(monthly_pi, |acc, v| checked_sum(acc, v, "total monthly payment"))?;

    let months = Decimal::from(params.total_periods);
    let years = Decimal::from(input.term_years);
    let escrow = checked_sum(
        input.annual_property_tax,
        input.annual_insurance,
        "annual escrow",
    )?;
    let total_cost = [
        checked_product(escrow, years, "lifetime escrow")?,
        checked_product(input.monthly_hoa, months, "lifetime HOA")?,
        input.down_payment,
    ]
    .into_iter()
    .try_fold(
        checked_product(monthly_pi, months, "lifetime principal and interest")?,
        |acc, v| checked_sum(acc, v, "total cost"),
    )?;

    let accelerated = if input.extra_payment > Decimal::ZERO {
        let summary = &amortized.summary;
        Some(AcceleratedPayoff {
            extra_payment: input.extra_payment,
            payoff_period: summary.payoff_period,
            payoff_date: summary.payoff_date,
            total_interest: summary.total_interest_paid,
            years_shorter: (Decimal::from(amortized.comparison.term_reduced_periods)
                / MONTHS_PER_YEAR)
                .round_dp(1),
            comparison: amortized.comparison.clone(),
        })
    } else {
        None
    };

    let output = MortgageOutput {
        loan_amount,
        down_payment_pct,
        monthly_principal_interest: monthly_pi,
        monthly_property_tax,
        monthly_insurance,
        monthly_hoa: input.monthly_hoa,
        monthly_pmi,
        total_monthly_payment,
        total_interest: baseline.total_interest_paid,
        total_cost,
        accelerated,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage PITI breakdown with accelerated payoff",
        &serde_json::json!({
            "property_price": input.property_price.to_string(),
            "down_payment": input.down_payment.to_string(),
            "annual_rate": input.annual_rate.to_string(),
            "term_years": input.term_years,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn validate(input: &MortgageInput) -> EngineResult<()> {
    if input.property_price <= Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "property_price",
            "Property price must be positive",
        ));
    }
    if input.down_payment < Decimal::ZERO || input.down_payment >= input.property_price {
        return Err(AmortizationError::invalid(
            "down_payment",
            "Down payment must be at least 0 and below the property price",
        ));
    }
    if input.term_years == 0 || input.term_years > 50 {
        return Err(AmortizationError::invalid(
            "term_years",
            "Term must be between 1 and 50 years",
        ));
    }
    for (field, value) in [
        ("annual_property_tax", input.annual_property_tax),
        ("annual_insurance", input.annual_insurance),
        ("monthly_hoa", input.monthly_hoa),
        ("annual_pmi_rate", input.annual_pmi_rate),
    ] {
        if value < Decimal::ZERO {
            return Err(AmortizationError::invalid(field, "Cannot be negative"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_input() -> MortgageInput {
        MortgageInput {
            property_price: dec!(400000),
            down_payment: dec!(80000),
            annual_rate: dec!(0.06),
            term_years: 30,
            annual_property_tax: dec!(4800),
            annual_insurance: dec!(1200),
            monthly_hoa: Decimal::ZERO,
            annual_pmi_rate: dec!(0.005),
            extra_payment: Decimal::ZERO,
            first_payment_date: None,
        }
    }

    #[test]
    fn test_principal_and_interest() {
        let out = analyze_mortgage(&default_input()).unwrap().result;
        assert_eq!(out.loan_amount, dec!(320000));
        // 320,000 at 6% over 30 years ≈ 1918.56
        assert!((out.monthly_principal_interest - dec!(1918.56)).abs() < dec!(0.01));
    }

    #[test]
    fn test_twenty_percent_down_has_no_pmi() {
        let out = analyze_mortgage(&default_input()).unwrap().result;
        assert_eq!(out.monthly_pmi, Decimal::ZERO);
    }

    #[test]
    fn test_small_down_payment_adds_pmi() {
        let mut input = default_input();
        input.down_payment = dec!(40000);
        let out = analyze_mortgage(&input).unwrap().result;
        // 360,000 × 0.5% / 12 = 150
        assert_eq!(out.monthly_pmi, dec!(150));
    }

    #[test]
    fn test_total_monthly_includes_escrow() {
        let out = analyze_mortgage(&default_input()).unwrap().result;
        assert_eq!(out.monthly_property_tax, dec!(400));
        assert_eq!(out.monthly_insurance, dec!(100));
        assert_eq!(
            out.total_monthly_payment,
            out.monthly_principal_interest + dec!(500)
        );
    }

    #[test]
    fn test_extra_payment_accelerates() {
        let mut input = default_input();
        input.extra_payment = dec!(200);
        let out = analyze_mortgage(&input).unwrap().result;
        let acc = out.accelerated.unwrap();
        assert!(acc.payoff_period < 360);
        assert!(acc.comparison.interest_saved > Decimal::ZERO);
        assert!(acc.years_shorter > Decimal::ZERO);
    }

    #[test]
    fn test_lifetime_cost_overflow_is_non_finite() {
        let mut input = default_input();
        input.property_price = dec!(70000000000000000000000000000);
        input.down_payment = Decimal::ZERO;
        input.annual_rate = Decimal::ZERO;
        input.term_years = 1;
        input.annual_property_tax = dec!(70000000000000000000000000000);
        assert!(matches!(
            analyze_mortgage(&input),
            Err(AmortizationError::NonFiniteResult { .. })
        ));
    }

    #[test]
    fn test_down_payment_at_price_is_invalid() {
        let mut input = default_input();
        input.down_payment = input.property_price;
        assert!(analyze_mortgage(&input).is_err());
    }
}
