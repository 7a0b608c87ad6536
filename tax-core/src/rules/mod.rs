//! Immutable, versioned tax rule tables.
//!
//! A [`RuleTableStore`] holds every constant the calculator needs for one tax
//! year: the federal bracket table and standard deduction for each filing
//! status, a flat rate per jurisdiction code, and the FICA constants.
//!
//! A store is validated once when it is built and is never mutated
//! afterwards, so it can be shared by reference across any number of
//! concurrent calculations. A new tax year means building a new store, not
//! updating an existing one.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{FilingStatus, RuleTableStore};
//!
//! let rules = RuleTableStore::tax_year_2024();
//!
//! assert_eq!(rules.standard_deduction_for(FilingStatus::Single), dec!(13850));
//! assert_eq!(rules.flat_rate_for("CA"), dec!(0.093));
//! assert_eq!(rules.flat_rate_for("ZZ"), dec!(0));
//! ```

mod tax_year_2024;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{FicaConstants, FilingStatus, TaxBracket};

/// Errors raised when a set of rule tables is not well formed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleTableError {
    /// A filing status has an empty bracket table.
    #[error("no tax brackets for {0}")]
    NoBrackets(FilingStatus),

    /// The first bracket of a table must start at zero.
    #[error("first bracket for {status} starts at {min_income}, expected 0")]
    FirstBracketNotAtZero {
        status: FilingStatus,
        min_income: Decimal,
    },

    /// A bracket does not start where the previous one ended.
    #[error("bracket for {status} starts at {min_income}, expected {expected}")]
    NonContiguousBrackets {
        status: FilingStatus,
        expected: Decimal,
        min_income: Decimal,
    },

    /// A bounded bracket whose upper bound is not above its lower bound.
    #[error("bracket for {status} starting at {min_income} has upper bound {max_income}")]
    EmptyBracket {
        status: FilingStatus,
        min_income: Decimal,
        max_income: Decimal,
    },

    /// Only the last bracket of a table may be unbounded.
    #[error("unbounded bracket for {status} starting at {min_income} is not the last bracket")]
    UnboundedBracketNotLast {
        status: FilingStatus,
        min_income: Decimal,
    },

    /// The last bracket of a table must be unbounded.
    #[error("last bracket for {0} must be unbounded")]
    LastBracketBounded(FilingStatus),

    #[error("tax rate for {status} must be between 0 and 1, got {rate}")]
    InvalidBracketRate { status: FilingStatus, rate: Decimal },

    #[error("standard deduction for {status} must be non-negative, got {amount}")]
    NegativeStandardDeduction {
        status: FilingStatus,
        amount: Decimal,
    },

    #[error("jurisdiction rate for '{code}' must be between 0 and 1, got {rate}")]
    InvalidJurisdictionRate { code: String, rate: Decimal },

    #[error("social security wage base must be positive, got {0}")]
    InvalidSsWageBase(Decimal),

    #[error("{name} must be between 0 and 1, got {rate}")]
    InvalidFicaRate { name: &'static str, rate: Decimal },

    #[error("additional medicare threshold must be non-negative, got {0}")]
    InvalidMedicareThreshold(Decimal),
}

/// One value per filing status. Lookups are total by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingStatusTable<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub married_filing_separately: T,
    pub head_of_household: T,
}

impl<T> FilingStatusTable<T> {
    pub fn get(
        &self,
        status: FilingStatus,
    ) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }

    /// Builds a table by calling `f` once per filing status, stopping at the
    /// first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(FilingStatus) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            single: f(FilingStatus::Single)?,
            married_filing_jointly: f(FilingStatus::MarriedFilingJointly)?,
            married_filing_separately: f(FilingStatus::MarriedFilingSeparately)?,
            head_of_household: f(FilingStatus::HeadOfHousehold)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilingStatus, &T)> {
        FilingStatus::all()
            .iter()
            .map(move |status| (*status, self.get(*status)))
    }
}

/// Validated rule tables for a single tax year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTableStore {
    tax_year: i32,
    brackets: FilingStatusTable<Vec<TaxBracket>>,
    standard_deductions: FilingStatusTable<Decimal>,
    jurisdiction_rates: BTreeMap<String, Decimal>,
    fica: FicaConstants,
}

impl RuleTableStore {
    /// Builds and validates a store.
    ///
    /// Jurisdiction codes are stored upper-cased; lookups are
    /// case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTableError`] if any bracket table is not contiguous from
    /// zero to an unbounded final bracket, or if any rate, deduction or FICA
    /// constant is out of range.
    pub fn new(
        tax_year: i32,
        brackets: FilingStatusTable<Vec<TaxBracket>>,
        standard_deductions: FilingStatusTable<Decimal>,
        jurisdiction_rates: BTreeMap<String, Decimal>,
        fica: FicaConstants,
    ) -> Result<Self, RuleTableError> {
        let store = Self {
            tax_year,
            brackets,
            standard_deductions,
            jurisdiction_rates: jurisdiction_rates
                .into_iter()
                .map(|(code, rate)| (normalize_code(&code), rate))
                .collect(),
            fica,
        };
        store.validate()?;

        debug!(
            tax_year,
            jurisdictions = store.jurisdiction_rates.len(),
            "rule tables built"
        );
        Ok(store)
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    /// Bracket table for `status`, ascending from zero.
    pub fn brackets_for(
        &self,
        status: FilingStatus,
    ) -> &[TaxBracket] {
        self.brackets.get(status)
    }

    pub fn standard_deduction_for(
        &self,
        status: FilingStatus,
    ) -> Decimal {
        *self.standard_deductions.get(status)
    }

    /// Flat rate for a jurisdiction code; unknown codes have a rate of zero.
    pub fn flat_rate_for(
        &self,
        jurisdiction_code: &str,
    ) -> Decimal {
        self.jurisdiction_rate(jurisdiction_code)
            .unwrap_or(Decimal::ZERO)
    }

    /// Flat rate for a jurisdiction code, `None` when the code is unknown.
    pub fn jurisdiction_rate(
        &self,
        jurisdiction_code: &str,
    ) -> Option<Decimal> {
        self.jurisdiction_rates
            .get(&normalize_code(jurisdiction_code))
            .copied()
    }

    /// Known jurisdiction codes in alphabetical order.
    pub fn jurisdiction_codes(&self) -> impl Iterator<Item = &str> {
        self.jurisdiction_rates.keys().map(String::as_str)
    }

    pub fn fica_constants(&self) -> &FicaConstants {
        &self.fica
    }

    /// Checks every table invariant.
    ///
    /// # Errors
    ///
    /// See [`RuleTableStore::new`].
    pub fn validate(&self) -> Result<(), RuleTableError> {
        for (status, brackets) in self.brackets.iter() {
            validate_brackets(status, brackets)?;
        }

        for (status, amount) in self.standard_deductions.iter() {
            if *amount < Decimal::ZERO {
                return Err(RuleTableError::NegativeStandardDeduction {
                    status,
                    amount: *amount,
                });
            }
        }

        for (code, rate) in &self.jurisdiction_rates {
            if !is_fraction(*rate) {
                return Err(RuleTableError::InvalidJurisdictionRate {
                    code: code.clone(),
                    rate: *rate,
                });
            }
        }

        validate_fica(&self.fica)
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn is_fraction(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}

fn validate_brackets(
    status: FilingStatus,
    brackets: &[TaxBracket],
) -> Result<(), RuleTableError> {
    let first = brackets.first().ok_or(RuleTableError::NoBrackets(status))?;
    if first.min_income != Decimal::ZERO {
        return Err(RuleTableError::FirstBracketNotAtZero {
            status,
            min_income: first.min_income,
        });
    }

    let last_index = brackets.len() - 1;
    let mut expected_min = Decimal::ZERO;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.min_income != expected_min {
            return Err(RuleTableError::NonContiguousBrackets {
                status,
                expected: expected_min,
                min_income: bracket.min_income,
            });
        }
        if !is_fraction(bracket.tax_rate) {
            return Err(RuleTableError::InvalidBracketRate {
                status,
                rate: bracket.tax_rate,
            });
        }

        match bracket.max_income {
            Some(max_income) if max_income <= bracket.min_income => {
                return Err(RuleTableError::EmptyBracket {
                    status,
                    min_income: bracket.min_income,
                    max_income,
                });
            }
            Some(_) if index == last_index => {
                return Err(RuleTableError::LastBracketBounded(status));
            }
            Some(max_income) => expected_min = max_income,
            None if index != last_index => {
                return Err(RuleTableError::UnboundedBracketNotLast {
                    status,
                    min_income: bracket.min_income,
                });
            }
            None => {}
        }
    }

    Ok(())
}

fn validate_fica(fica: &FicaConstants) -> Result<(), RuleTableError> {
    if fica.ss_wage_base <= Decimal::ZERO {
        return Err(RuleTableError::InvalidSsWageBase(fica.ss_wage_base));
    }

    for (name, rate) in [
        ("social security rate", fica.ss_tax_rate),
        ("medicare rate", fica.medicare_tax_rate),
        ("additional medicare rate", fica.additional_medicare_rate),
    ] {
        if !is_fraction(rate) {
            return Err(RuleTableError::InvalidFicaRate { name, rate });
        }
    }

    for threshold in [
        fica.additional_medicare_threshold_joint,
        fica.additional_medicare_threshold_other,
    ] {
        if threshold < Decimal::ZERO {
            return Err(RuleTableError::InvalidMedicareThreshold(threshold));
        }
    }

    Ok(())
}
