use clap::Args;
use serde_json::Value;

use amortization_core::consolidation::estimator::{self, ConsolidationInput};

use crate::input;

/// Arguments for the debt consolidation estimator
#[derive(Args)]
pub struct ConsolidateArgs {
    /// Path to JSON or YAML input file listing the debts and the new loan
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_consolidate(args: ConsolidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let consolidation_input: ConsolidationInput = input::load(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for debt consolidation")?;
    let result = estimator::analyze_consolidation(&consolidation_input)?;
    Ok(serde_json::to_value(result)?)
}
