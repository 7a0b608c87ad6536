use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tax_cli::app::{self, BUILT_IN_TAX_YEAR};
use tax_cli::report::{CalculationReport, SuggestionReport};
use tax_cli::utils::{parse_decimal, parse_filing_status, parse_occupation};
use tax_core::{
    DeductionAdvisor, FilingStatus, OccupationCategory, TaxCalculationInput, TaxCalculator,
};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Income tax liability calculator and deduction advisor.
///
/// Calculates federal, jurisdiction and FICA tax from a versioned set of rule
/// tables, or suggests likely deductions from income and occupation.
#[derive(Debug, Parser)]
#[command(name = "tax-engine", version)]
struct Cli {
    /// Directory holding the rule table CSV files.
    /// Defaults to the built-in tables.
    #[arg(long, global = true)]
    rules_dir: Option<PathBuf>,

    /// Tax year to calculate for.
    #[arg(long, global = true, default_value_t = BUILT_IN_TAX_YEAR)]
    year: i32,

    /// Print results as JSON instead of a text report.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate the full tax liability for one taxpayer.
    Calculate {
        /// Gross annual income, e.g. `75000` or `75,000.00`.
        #[arg(long, value_parser = parse_decimal)]
        income: Decimal,

        /// Filing status: S, MFJ, MFS or HOH.
        #[arg(long, default_value = "S", value_parser = parse_filing_status)]
        status: FilingStatus,

        /// Two-letter jurisdiction (state) code.
        #[arg(long)]
        state: String,

        /// Itemized deduction total.
        #[arg(long, value_parser = parse_decimal)]
        itemized: Option<Decimal>,

        /// Deduction records CSV; deductible amounts are added to the
        /// itemized total.
        #[arg(long)]
        deductions_csv: Option<PathBuf>,
    },

    /// Suggest deductions the taxpayer is likely eligible for.
    Suggest {
        /// Gross annual income.
        #[arg(long, value_parser = parse_decimal)]
        income: Decimal,

        /// Occupation, e.g. `technology` or `Software Engineer`.
        #[arg(long, default_value = "other", value_parser = parse_occupation)]
        occupation: OccupationCategory,
    },
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Writes to stderr so reports and JSON on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Calculate {
            income,
            status,
            state,
            itemized,
            deductions_csv,
        } => {
            let rules = app::load_rules(cli.rules_dir.as_deref(), cli.year)?;
            let itemized = app::itemized_deductions(itemized, deductions_csv.as_deref())?;
            let input = TaxCalculationInput::new(income, status, state, itemized);

            debug!("calculating {} tax for {}", rules.tax_year(), status);
            let result = TaxCalculator::new(&rules).calculate(&input)?;

            if cli.json {
                let json = serde_json::to_string_pretty(&result)
                    .context("Failed to serialize result")?;
                println!("{json}");
            } else {
                println!(
                    "{}",
                    CalculationReport {
                        input: &input,
                        result: &result,
                    }
                );
            }
        }
        Command::Suggest { income, occupation } => {
            let suggestions = DeductionAdvisor::default().suggest(income, occupation);

            if cli.json {
                let json = serde_json::to_string_pretty(&suggestions)
                    .context("Failed to serialize suggestions")?;
                println!("{json}");
            } else {
                println!("{}", SuggestionReport(&suggestions));
            }
        }
    }

    Ok(())
}
