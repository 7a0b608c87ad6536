use std::path::Path;

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use tax_core::{RuleTableStore, TaxCalculatorError};
use tax_data::{RuleTableLoader, deductions, itemized_total};
use tracing::{debug, info};

pub const BUILT_IN_TAX_YEAR: i32 = 2024;

/// Builds the rule tables for `year`.
///
/// Reads the CSV rule table files in `rules_dir` when one is given, otherwise
/// falls back to the built-in tables (only available for
/// [`BUILT_IN_TAX_YEAR`]).
pub fn load_rules(
    rules_dir: Option<&Path>,
    year: i32,
) -> Result<RuleTableStore> {
    match rules_dir {
        Some(dir) => {
            debug!("loading rule tables from {}", dir.display());
            RuleTableLoader::load_dir(dir, year).with_context(|| {
                format!(
                    "Failed to load {year} rule tables from: {}",
                    dir.display()
                )
            })
        }
        None if year == BUILT_IN_TAX_YEAR => Ok(RuleTableStore::tax_year_2024()),
        None => bail!("no built-in rule tables for tax year {year}; pass --rules-dir"),
    }
}

/// Combines an itemized amount given directly with the deductible total of a
/// deduction records file.
///
/// A negative explicit amount is rejected before any records are added.
pub fn itemized_deductions(
    itemized: Option<Decimal>,
    deductions_csv: Option<&Path>,
) -> Result<Decimal> {
    let mut total = itemized.unwrap_or(Decimal::ZERO);
    if total < Decimal::ZERO {
        return Err(TaxCalculatorError::InvalidInput {
            field: "itemized_deductions",
            value: total,
        }
        .into());
    }

    if let Some(path) = deductions_csv {
        let records = deductions::load_from_file(path)
            .with_context(|| format!("Failed to load deductions: {}", path.display()))?;
        let from_records = itemized_total(&records);
        info!(
            "{} deduction records, {} deductible",
            records.len(),
            from_records
        );
        total += from_records;
    }

    Ok(total)
}
