use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use amortization_core::mortgage::payment::{self, MortgageInput};

use crate::input;

/// Arguments for the mortgage payment breakdown
#[derive(Args)]
pub struct MortgageArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price of the property
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment
    #[arg(long)]
    pub down: Option<Decimal>,

    /// Annual mortgage rate as a decimal (0.065 = 6.5%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Term in years
    #[arg(long, default_value_t = 30)]
    pub years: u32,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual homeowner's insurance
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa: Option<Decimal>,

    /// Annual PMI rate as a decimal of the loan amount
    #[arg(long)]
    pub pmi_rate: Option<Decimal>,

    /// Extra principal paid every month
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Due date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgage_input: MortgageInput = match input::load(args.input.as_deref())? {
        Some(data) => data,
        None => MortgageInput {
            property_price: args.price.ok_or("--price is required (or provide --input)")?,
            down_payment: args.down.unwrap_or(Decimal::ZERO),
            annual_rate: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            term_years: args.years,
            annual_property_tax: args.property_tax.unwrap_or(Decimal::ZERO),
            annual_insurance: args.insurance.unwrap_or(Decimal::ZERO),
            monthly_hoa: args.hoa.unwrap_or(Decimal::ZERO),
            annual_pmi_rate: args.pmi_rate.unwrap_or(Decimal::ZERO),
            extra_payment: args.extra.unwrap_or(Decimal::ZERO),
            first_payment_date: args.first_payment_date,
        },
    };

    let result = payment::analyze_mortgage(&mortgage_input)?;
    Ok(serde_json::to_value(result)?)
}
