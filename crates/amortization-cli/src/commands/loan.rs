use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use amortization_core::amortization::{
    self, AmortizationSummary, LoanParameters, LoanTerms, ScheduleRequest,
};
use amortization_core::time_value;
use amortization_core::PaymentFrequency;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Weekly => PaymentFrequency::Weekly,
            FrequencyArg::Biweekly => PaymentFrequency::Biweekly,
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
            FrequencyArg::Quarterly => PaymentFrequency::Quarterly,
            FrequencyArg::SemiAnnual => PaymentFrequency::SemiAnnual,
            FrequencyArg::Annual => PaymentFrequency::Annual,
        }
    }
}

/// A loan in an input file, quoted either annually or per period.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LoanSpec {
    Terms(LoanTerms),
    Periodic(LoanParameters),
}

impl LoanSpec {
    fn into_parameters(self) -> Result<LoanParameters, Box<dyn std::error::Error>> {
        match self {
            LoanSpec::Terms(terms) => Ok(terms.to_parameters()?),
            LoanSpec::Periodic(params) => Ok(params),
        }
    }
}

/// Loan terms shared by the loan commands
#[derive(Args)]
pub struct LoanTermArgs {
    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate as a decimal (0.08 = 8%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Payment frequency
    #[arg(long, value_enum, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Due date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,
}

impl LoanTermArgs {
    fn to_terms(&self, extra: Option<Decimal>, elapsed: Option<u32>) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let annual_rate = self
            .annual_rate
            .ok_or("--annual-rate is required (or provide --input)")?;
        let term_years = self.years.ok_or("--years is required (or provide --input)")?;

        Ok(LoanTerms {
            principal,
            annual_rate,
            term_years,
            frequency: self.frequency.into(),
            extra_payment: extra.unwrap_or(Decimal::ZERO),
            periods_already_elapsed: elapsed.unwrap_or(0),
            first_payment_date: self.first_payment_date,
        })
    }
}

fn load_parameters(
    path: Option<&str>,
    terms: &LoanTermArgs,
    extra: Option<Decimal>,
    elapsed: Option<u32>,
) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    match input::load::<LoanSpec>(path)? {
        Some(spec) => spec.into_parameters(),
        None => Ok(terms.to_terms(extra, elapsed)?.to_parameters()?),
    }
}

// ---------------------------------------------------------------------------
// payment
// ---------------------------------------------------------------------------

/// Arguments for the periodic payment solver
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: LoanTermArgs,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = load_parameters(args.input.as_deref(), &args.terms, None, None)?;
    let payment = time_value::compute_periodic_payment(
        params.principal,
        params.periodic_rate,
        params.total_periods,
    )?;
    let total_paid = payment * Decimal::from(params.total_periods);

    Ok(json!({
        "result": {
            "periodic_payment": payment.round_dp(2).to_string(),
            "periodic_rate": params.periodic_rate.to_string(),
            "total_periods": params.total_periods,
            "total_paid": total_paid.round_dp(2).to_string(),
            "total_interest": (total_paid - params.principal).round_dp(2).to_string(),
        }
    }))
}

// ---------------------------------------------------------------------------
// schedule
// ---------------------------------------------------------------------------

/// Arguments for a raw amortization walk
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON or YAML schedule request (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: LoanTermArgs,

    /// Extra principal paid every period
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Fixed payment to use instead of the solved annuity payment
    #[arg(long)]
    pub payment: Option<Decimal>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ScheduleRequest = match input::load(args.input.as_deref())? {
        Some(request) => request,
        None => {
            let params = args.terms.to_terms(args.extra, None)?.to_parameters()?;
            let periodic_payment = match args.payment {
                Some(p) => p,
                None => time_value::compute_periodic_payment(
                    params.principal,
                    params.periodic_rate,
                    params.total_periods,
                )?,
            };
            ScheduleRequest {
                principal: params.principal,
                periodic_rate: params.periodic_rate,
                total_periods: params.total_periods,
                periodic_payment,
                extra_payment: params.extra_payment,
                start_period_offset: 0,
                first_payment_date: params.first_payment_date,
                frequency: params.frequency,
            }
        }
    };

    let rows = amortization::generate_schedule(&request)?;
    let summary =
        amortization::summarize(request.periodic_payment, &rows, request.start_period_offset)?;
    Ok(json!({
        "result": {
            "summary": summary,
            "schedule": rows,
        }
    }))
}

// ---------------------------------------------------------------------------
// amortize
// ---------------------------------------------------------------------------

/// Arguments for full amortization with early payoff
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON or YAML loan file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub terms: LoanTermArgs,

    /// Extra principal paid every period
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Payments already made before the extra payment starts
    #[arg(long)]
    pub elapsed: Option<u32>,
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = load_parameters(args.input.as_deref(), &args.terms, args.extra, args.elapsed)?;
    let result = amortization::amortize(&params)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// compare
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CompareInput {
    baseline: AmortizationSummary,
    accelerated: AmortizationSummary,
}

/// Arguments for comparing two schedule summaries
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a file holding `baseline` and `accelerated` summaries
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let compare: CompareInput = input::load(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for compare")?;
    let result = amortization::compare_to_baseline(&compare.baseline, &compare.accelerated);
    Ok(json!({ "result": result }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_loan_spec_accepts_annual_terms() {
        let spec: LoanSpec = serde_json::from_str(
            r#"{"principal": "10000", "annual_rate": "0.08", "term_years": 5}"#,
        )
        .unwrap();
        let params = spec.into_parameters().unwrap();
        assert_eq!(params.total_periods, 60);
        assert_eq!(params.principal, dec!(10000));
    }

    #[test]
    fn test_loan_spec_accepts_periodic_parameters() {
        let spec: LoanSpec = serde_json::from_str(
            r#"{"principal": "5000", "periodic_rate": "0.01", "total_periods": 24, "extra_payment": "50"}"#,
        )
        .unwrap();
        let params = spec.into_parameters().unwrap();
        assert_eq!(params.total_periods, 24);
        assert_eq!(params.extra_payment, dec!(50));
    }
}
