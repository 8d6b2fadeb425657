//! Debt consolidation estimator.
//!
//! Rolls several existing debts into one new loan and compares monthly
//! payment, lifetime interest and total cost, then checks how much sooner
//! the consolidated loan is repaid with a fixed extra monthly payment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{generate_schedule, summarize, ScheduleRequest};
use crate::error::AmortizationError;
use crate::time_value::{checked_product, checked_sum, compute_periodic_payment};
use crate::types::{with_metadata, ComputationOutput, Money, PaymentFrequency, Rate};
use crate::EngineResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

fn default_extra_payment() -> Money {
    dec!(50)
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingDebt {
    pub name: String,
    pub balance: Money,
    /// Annual rate as a decimal (0.199 = 19.9%).
    pub annual_rate: Rate,
    pub remaining_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationInput {
    pub debts: Vec<ExistingDebt>,
    pub new_annual_rate: Rate,
    pub new_term_months: u32,
    /// Origination fees rolled into the new loan.
    #[serde(default)]
    pub fees: Money,
    /// Extra monthly payment used for the accelerated-payoff analysis.
    #[serde(default = "default_extra_payment")]
    pub extra_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPosition {
    pub total_debt: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_cost: Money,
    pub payoff_months: u32,
}

/// Consolidated minus current; negative values favour consolidating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationDifference {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentAnalysis {
    pub extra_payment: Money,
    pub payoff_months: u32,
    pub interest_savings: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationOutput {
    pub current: DebtPosition,
    pub consolidated: DebtPosition,
    pub difference: ConsolidationDifference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_payment_analysis: Option<ExtraPaymentAnalysis>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

pub fn analyze_consolidation(
    input: &ConsolidationInput,
) -> EngineResult<ComputationOutput<ConsolidationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.new_term_months == 0 {
        return Err(AmortizationError::invalid(
            "new_term_months",
            "New loan term must be at least one month",
        ));
    }
    if input.fees < Decimal::ZERO {
        return Err(AmortizationError::invalid("fees", "Fees cannot be negative"));
    }
    if input.extra_payment < Decimal::ZERO {
        return Err(AmortizationError::invalid(
            "extra_payment",
            "Extra payment cannot be negative",
        ));
    }

    // Current position
    let mut total_debt = Decimal::ZERO;
    let mut current_payment = Decimal::ZERO;
    let mut current_interest = Decimal::ZERO;
    let mut payoff_months = 0u32;

    for debt in &input.debts {
        if debt.balance <= Decimal::ZERO || debt.remaining_months == 0 {
            warnings.push(format!(
                "Debt '{}' skipped: needs a positive balance and remaining term",
                debt.name
            ));
            continue;
        }
        let payment = compute_periodic_payment(
            debt.balance,
            debt.annual_rate / MONTHS_PER_YEAR,
            debt.remaining_months,
        )?;
        let lifetime_paid =
            checked_product(payment, Decimal::from(debt.remaining_months), "lifetime payments")?;
        total_debt = checked_sum(total_debt, debt.balance, "total debt")?;
        current_payment = checked_sum(current_payment, payment, "current monthly payment")?;
        current_interest =
            checked_sum(current_interest, lifetime_paid - debt.balance, "current interest")?;
        payoff_months = payoff_months.max(debt.remaining_months);
    }

    if total_debt.is_zero() {
        return Err(AmortizationError::invalid(
            "debts",
            "At least one debt with a positive balance is required",
        ));
    }

    let current = DebtPosition {
        total_debt,
        monthly_payment: current_payment,
        total_interest: current_interest,
        total_cost: checked_sum(total_debt, current_interest, "current total cost")?,
        payoff_months,
    };

    // Consolidated loan
    let new_principal = checked_sum(total_debt, input.fees, "consolidated principal")?;
    let new_rate = input.new_annual_rate / MONTHS_PER_YEAR;
    let new_payment = compute_periodic_payment(new_principal, new_rate, input.new_term_months)?;
    let new_interest = checked_product(
        new_payment,
        Decimal::from(input.new_term_months),
        "consolidated lifetime payments",
    )? - new_principal;

    let consolidated = DebtPosition {
        total_debt: new_principal,
        monthly_payment: new_payment,
        total_interest: new_interest,
        total_cost: checked_sum(new_principal, new_interest, "consolidated total cost")?,
        payoff_months: input.new_term_months,
    };

    let difference = ConsolidationDifference {
        monthly_payment: consolidated.monthly_payment - current.monthly_payment,
        total_interest: consolidated.total_interest - current.total_interest,
        total_cost: consolidated.total_cost - current.total_cost,
    };

    let extra_payment_analysis = if input.extra_payment > Decimal::ZERO {
        let rows = generate_schedule(&ScheduleRequest {
            principal: new_principal,
            periodic_rate: new_rate,
            total_periods: input.new_term_months,
            periodic_payment: new_payment,
            extra_payment: input.extra_payment,
            start_period_offset: 0,
            first_payment_date: None,
            frequency: PaymentFrequency::Monthly,
        })?;
        let summary = summarize(new_payment, &rows, 0)?;
        if summary.actual_periods_to_payoff < input.new_term_months {
            Some(ExtraPaymentAnalysis {
                extra_payment: input.extra_payment,
                payoff_months: summary.actual_periods_to_payoff,
                interest_savings: new_interest - summary.total_interest_paid,
            })
        } else {
            None
        }
    } else {
        None
    };

    let output = ConsolidationOutput {
        current,
        consolidated,
        difference,
        extra_payment_analysis,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt consolidation comparison",
        &serde_json::json!({
            "debts": input.debts.len(),
            "new_annual_rate": input.new_annual_rate.to_string(),
            "new_term_months": input.new_term_months,
            "fees": input.fees.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
