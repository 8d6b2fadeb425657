pub mod loan;
pub mod schedule;
pub mod summary;

pub use loan::{amortize, AmortizationOutput, LoanParameters, LoanTerms};
pub use schedule::{generate_schedule, AmortizationRow, ScheduleRequest};
pub use summary::{
    annual_summaries, compare_to_baseline, summarize, AmortizationSummary, AnnualSummary,
    PayoffComparison,
};
