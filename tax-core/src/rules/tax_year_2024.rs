//! Built-in rule tables for the 2024 tax year.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{FilingStatusTable, RuleTableStore};
use crate::models::{FicaConstants, TaxBracket};

/// Builds a bracket table from `(upper bound, rate)` pairs; the final pair
/// must have no upper bound.
fn table(slices: &[(Option<Decimal>, Decimal)]) -> Vec<TaxBracket> {
    let mut min_income = Decimal::ZERO;
    slices
        .iter()
        .map(|(max_income, rate)| {
            let bracket = TaxBracket::new(min_income, *max_income, *rate);
            if let Some(max) = max_income {
                min_income = *max;
            }
            bracket
        })
        .collect()
}

fn brackets() -> FilingStatusTable<Vec<TaxBracket>> {
    FilingStatusTable {
        single: table(&[
            (Some(dec!(11000)), dec!(0.10)),
            (Some(dec!(44725)), dec!(0.12)),
            (Some(dec!(95375)), dec!(0.22)),
            (Some(dec!(182050)), dec!(0.24)),
            (Some(dec!(231250)), dec!(0.32)),
            (Some(dec!(578125)), dec!(0.35)),
            (None, dec!(0.37)),
        ]),
        married_filing_jointly: table(&[
            (Some(dec!(22000)), dec!(0.10)),
            (Some(dec!(89450)), dec!(0.12)),
            (Some(dec!(190750)), dec!(0.22)),
            (Some(dec!(364200)), dec!(0.24)),
            (Some(dec!(462500)), dec!(0.32)),
            (Some(dec!(693750)), dec!(0.35)),
            (None, dec!(0.37)),
        ]),
        married_filing_separately: table(&[
            (Some(dec!(11000)), dec!(0.10)),
            (Some(dec!(44725)), dec!(0.12)),
            (Some(dec!(95375)), dec!(0.22)),
            (Some(dec!(182100)), dec!(0.24)),
            (Some(dec!(231250)), dec!(0.32)),
            (Some(dec!(346875)), dec!(0.35)),
            (None, dec!(0.37)),
        ]),
        head_of_household: table(&[
            (Some(dec!(15700)), dec!(0.10)),
            (Some(dec!(59850)), dec!(0.12)),
            (Some(dec!(95350)), dec!(0.22)),
            (Some(dec!(182050)), dec!(0.24)),
            (Some(dec!(231250)), dec!(0.32)),
            (Some(dec!(578100)), dec!(0.35)),
            (None, dec!(0.37)),
        ]),
    }
}

fn standard_deductions() -> FilingStatusTable<Decimal> {
    FilingStatusTable {
        single: dec!(13850),
        married_filing_jointly: dec!(27700),
        married_filing_separately: dec!(13850),
        head_of_household: dec!(20800),
    }
}

// Simplified flat state rates.
fn jurisdiction_rates() -> BTreeMap<String, Decimal> {
    [
        ("AL", dec!(0.05)),
        ("AK", dec!(0.00)),
        ("AZ", dec!(0.045)),
        ("AR", dec!(0.063)),
        ("CA", dec!(0.093)),
        ("CO", dec!(0.044)),
        ("CT", dec!(0.069)),
        ("DE", dec!(0.066)),
        ("FL", dec!(0.00)),
        ("GA", dec!(0.057)),
        ("HI", dec!(0.11)),
        ("ID", dec!(0.058)),
        ("IL", dec!(0.0495)),
        ("IN", dec!(0.032)),
        ("IA", dec!(0.067)),
        ("KS", dec!(0.057)),
        ("KY", dec!(0.05)),
        ("LA", dec!(0.06)),
        ("ME", dec!(0.075)),
        ("MD", dec!(0.0575)),
        ("MA", dec!(0.05)),
        ("MI", dec!(0.0425)),
        ("MN", dec!(0.0985)),
        ("MS", dec!(0.05)),
        ("MO", dec!(0.054)),
        ("MT", dec!(0.0675)),
        ("NE", dec!(0.0684)),
        ("NV", dec!(0.00)),
        ("NH", dec!(0.00)),
        ("NJ", dec!(0.1075)),
        ("NM", dec!(0.059)),
        ("NY", dec!(0.0882)),
        ("NC", dec!(0.0525)),
        ("ND", dec!(0.029)),
        ("OH", dec!(0.0399)),
        ("OK", dec!(0.05)),
        ("OR", dec!(0.099)),
        ("PA", dec!(0.0307)),
        ("RI", dec!(0.0599)),
        ("SC", dec!(0.07)),
        ("SD", dec!(0.00)),
        ("TN", dec!(0.00)),
        ("TX", dec!(0.00)),
        ("UT", dec!(0.0495)),
        ("VT", dec!(0.0876)),
        ("VA", dec!(0.0575)),
        ("WA", dec!(0.00)),
        ("WV", dec!(0.065)),
        ("WI", dec!(0.0765)),
        ("WY", dec!(0.00)),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect()
}

fn fica() -> FicaConstants {
    FicaConstants {
        ss_wage_base: dec!(160200),
        ss_tax_rate: dec!(0.062),
        medicare_tax_rate: dec!(0.0145),
        additional_medicare_rate: dec!(0.009),
        additional_medicare_threshold_joint: dec!(250000),
        additional_medicare_threshold_other: dec!(200000),
    }
}

impl RuleTableStore {
    /// Rule tables for the 2024 tax year.
    ///
    /// These tables are covered by the validation tests, so the store is
    /// built without re-running validation.
    pub fn tax_year_2024() -> Self {
        Self {
            tax_year: 2024,
            brackets: brackets(),
            standard_deductions: standard_deductions(),
            jurisdiction_rates: jurisdiction_rates(),
            fica: fica(),
        }
    }
}
