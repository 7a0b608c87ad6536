//! CSV loader for deduction records produced by document ingestion.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name) and
//! whitespace around headers and values is trimmed.
//!
//! | Column           | Type    | Notes                                    |
//! |------------------|---------|------------------------------------------|
//! | `name`           | string  | e.g. `Charitable donation`               |
//! | `amount`         | decimal | must not be negative                     |
//! | `category`       | string  | free text, e.g. `charity`, `medical`     |
//! | `tax_deductible` | bool    | `true`/`false`, `yes`/`no` or `1`/`0`    |
//!
//! ### Example
//!
//! ```csv
//! name,amount,category,tax_deductible
//! Mortgage interest,12000.00,housing,true
//! Gym membership,600.00,personal,false
//! ```
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// One expense or deduction extracted from a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRecord {
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub tax_deductible: bool,
}

/// Errors that can occur while loading deduction records.
#[derive(Debug, Error)]
pub enum DeductionRecordError {
    /// Bad structure, missing column or a value of the wrong type.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based and does not count the header.
    #[error("negative amount {amount} for '{name}' on row {row}")]
    NegativeAmount {
        name: String,
        amount: Decimal,
        row: usize,
    },

    #[error("failed to read deduction records: {0}")]
    Io(#[from] std::io::Error),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid tax_deductible flag '{other}'"
        ))),
    }
}

fn check_row(
    record: DeductionRecord,
    row_number: usize,
) -> Result<DeductionRecord, DeductionRecordError> {
    if record.amount < Decimal::ZERO {
        return Err(DeductionRecordError::NegativeAmount {
            name: record.name,
            amount: record.amount,
            row: row_number,
        });
    }
    Ok(record)
}

/// Parse CSV text and return the records in file order.
///
/// # Errors
///
/// * [`DeductionRecordError::Parse`] if the CSV is structurally invalid or a
///   field cannot be deserialised.
/// * [`DeductionRecordError::NegativeAmount`] if any row has a negative
///   amount.
pub fn load_from_str(input: &str) -> Result<Vec<DeductionRecord>, DeductionRecordError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<DeductionRecord>()
        .enumerate()
        .map(|(idx, result)| check_row(result?, idx + 1))
        .collect()
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<DeductionRecord>, DeductionRecordError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

/// Sum of the amounts of all tax-deductible records.
///
/// This is the itemized deduction total handed to the calculator.
pub fn itemized_total(records: &[DeductionRecord]) -> Decimal {
    records
        .iter()
        .filter(|record| {
            if !record.tax_deductible {
                debug!(name = %record.name, "skipping non-deductible record");
            }
            record.tax_deductible
        })
        .map(|record| record.amount)
        .sum()
}
