use rust_decimal::Decimal;
use tax_core::calculations::common::round_half_up;
use tax_core::{FilingStatus, OccupationCategory};
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace, and drops `$` signs and thousands separators.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace([',', '$'], "")
}

/// Parses a money amount such as `"75000"`, `"1,234.56"` or `"$250,000"`.
///
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

pub fn parse_filing_status(s: &str) -> Result<FilingStatus, String> {
    FilingStatus::parse(s).ok_or_else(|| {
        format!("unknown filing status '{s}' (expected one of S, MFJ, MFS, HOH)")
    })
}

/// Never fails; unrecognised text maps to [`OccupationCategory::Other`].
pub fn parse_occupation(s: &str) -> Result<OccupationCategory, String> {
    Ok(OccupationCategory::parse(s))
}

/// Formats an amount rounded to cents, e.g. `8760.50`.
pub fn money_display(d: Decimal) -> String {
    format!("{:.2}", round_half_up(d))
}

/// Formats a percentage rounded to two places, without trailing zeros.
pub fn percent_display(d: Decimal) -> String {
    format!("{}%", round_half_up(d).normalize())
}
