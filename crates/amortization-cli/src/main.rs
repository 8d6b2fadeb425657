mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use amortization_core::AmortizationError;
use commands::consolidation::ConsolidateArgs;
use commands::loan::{AmortizeArgs, CompareArgs, PaymentArgs, ScheduleArgs};
use commands::mortgage::MortgageArgs;

/// Loan amortization schedules and early-payoff analysis
#[derive(Parser)]
#[command(
    name = "amort",
    version,
    about = "Loan amortization schedules and early-payoff analysis",
    long_about = "A CLI for level-payment loan amortization with decimal precision. \
                  Solves the periodic payment, walks the schedule with optional extra \
                  payments, compares early payoff against the original term, and \
                  breaks down mortgage and debt consolidation costs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log more detail to stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the fixed periodic payment for a loan
    Payment(PaymentArgs),
    /// Walk a loan period by period and print the schedule
    Schedule(ScheduleArgs),
    /// Amortize with extra payments and compare against the original term
    Amortize(AmortizeArgs),
    /// Compare an accelerated schedule summary against its baseline
    Compare(CompareArgs),
    /// Mortgage payment breakdown (principal, interest, taxes, insurance, PMI)
    Mortgage(MortgageArgs),
    /// Compare existing debts against a single consolidation loan
    Consolidate(ConsolidateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Engine failures get their own exit codes so scripts can tell an
/// unserviceable payment apart from bad input.
fn exit_code(err: &(dyn std::error::Error + 'static)) -> i32 {
    match err.downcast_ref::<AmortizationError>() {
        Some(e) if e.is_non_converging() => 3,
        Some(_) => 2,
        None => 1,
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Amortize(args) => commands::loan::run_amortize(args),
        Commands::Compare(args) => commands::loan::run_compare(args),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args),
        Commands::Consolidate(args) => commands::consolidation::run_consolidate(args),
        Commands::Version => {
            println!("amort {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            let code = exit_code(e.as_ref());
            eprintln!("{}: {}", "error".red().bold(), e);
            if code == 3 {
                eprintln!(
                    "{}: the payment is too low to cover the loan's interest",
                    "hint".yellow().bold()
                );
            }
            process::exit(code);
        }
    }
}
