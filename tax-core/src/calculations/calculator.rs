//! Progressive tax calculator.
//!
//! Turns gross income, filing status, jurisdiction and itemized deductions
//! into a complete liability breakdown using a [`RuleTableStore`].
//!
//! # Calculation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Deduction: larger of standard deduction and itemized total |
//! | 2    | Taxable income: gross income − deduction (minimum 0) |
//! | 3    | Federal tax: walk the bracket table, one breakdown line per bracket used |
//! | 4    | Jurisdiction tax: taxable income × flat rate (0 for unknown codes) |
//! | 5    | FICA: social security (capped at wage base) + medicare + additional medicare |
//! | 6    | Totals: total tax, effective rate, after-tax income |
//! | 7    | Marginal rate: rate of the bracket containing taxable income |
//!
//! Every amount is an exact decimal product; nothing is rounded, so the
//! breakdown always sums exactly to taxable income and federal tax.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::TaxCalculator;
//! use tax_core::{FilingStatus, RuleTableStore, TaxCalculationInput};
//!
//! let rules = RuleTableStore::tax_year_2024();
//! let calculator = TaxCalculator::new(&rules);
//!
//! let input = TaxCalculationInput::new(dec!(75000), FilingStatus::Single, "CA", dec!(0));
//! let result = calculator.calculate(&input).unwrap();
//!
//! assert_eq!(result.taxable_income, dec!(61150));
//! assert_eq!(result.federal_tax, dec!(8760.50));
//! assert_eq!(result.marginal_rate, dec!(22));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::max;
use crate::models::{
    FicaBreakdown, FicaConstants, FilingStatus, TaxBracket, TaxBreakdown, TaxCalculationInput,
    TaxCalculationResult,
};
use crate::rules::RuleTableStore;

/// Errors that can occur during a tax calculation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxCalculatorError {
    /// A money input was negative.
    #[error("invalid input: {field} must be non-negative, got {value}")]
    InvalidInput { field: &'static str, value: Decimal },
}

/// Federal tax and the per-bracket lines that make it up.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BracketWalk {
    tax: Decimal,
    breakdown: Vec<TaxBreakdown>,
}

/// Calculator for a full tax liability breakdown.
///
/// Holds a shared reference to the rule tables and no other state, so one
/// calculator (or many) can be used from any number of threads at once.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    rules: &'a RuleTableStore,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(rules: &'a RuleTableStore) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'a RuleTableStore {
        self.rules
    }

    /// Calculates the complete tax breakdown for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxCalculatorError::InvalidInput`] if gross income or the
    /// itemized deduction total is negative. No partial result is produced.
    pub fn calculate(
        &self,
        input: &TaxCalculationInput,
    ) -> Result<TaxCalculationResult, TaxCalculatorError> {
        validate_non_negative("gross_income", input.gross_income)?;
        validate_non_negative("itemized_deductions", input.itemized_deductions)?;

        let status = input.filing_status;
        let gross_income = input.gross_income;
        let brackets = self.rules.brackets_for(status);

        let (effective_deduction, used_itemized) =
            self.determine_deduction(status, input.itemized_deductions);

        let taxable_income = self.taxable_income(gross_income, effective_deduction);

        let BracketWalk {
            tax: federal_tax,
            breakdown,
        } = self.walk_brackets(taxable_income, brackets);

        let jurisdiction_tax = self.jurisdiction_tax(taxable_income, &input.jurisdiction_code);

        let fica = self.fica_tax(gross_income, status, self.rules.fica_constants());
        let fica_tax = fica.total();

        let total_tax = federal_tax + jurisdiction_tax + fica_tax;
        let effective_rate = self.effective_rate(total_tax, gross_income);
        let marginal_rate = self.marginal_rate(taxable_income, brackets) * Decimal::ONE_HUNDRED;

        debug!(
            filing_status = status.as_str(),
            %gross_income,
            %taxable_income,
            %total_tax,
            "tax calculated"
        );

        Ok(TaxCalculationResult {
            gross_income,
            adjusted_gross_income: gross_income,
            effective_deduction,
            used_itemized_deduction: used_itemized,
            taxable_income,
            federal_tax,
            jurisdiction_tax,
            fica_tax,
            fica,
            total_tax,
            effective_rate,
            marginal_rate,
            after_tax_income: gross_income - total_tax,
            breakdown,
        })
    }

    /// Chooses the larger of the standard deduction and the itemized total.
    ///
    /// Returns the deduction and whether the itemized total was used.
    fn determine_deduction(
        &self,
        status: FilingStatus,
        itemized: Decimal,
    ) -> (Decimal, bool) {
        let standard = self.rules.standard_deduction_for(status);
        if itemized > standard {
            (itemized, true)
        } else {
            (standard, false)
        }
    }

    fn taxable_income(
        &self,
        gross_income: Decimal,
        deduction: Decimal,
    ) -> Decimal {
        max(gross_income - deduction, Decimal::ZERO)
    }

    /// Applies each bracket's rate to the slice of income that falls in it.
    fn walk_brackets(
        &self,
        taxable_income: Decimal,
        brackets: &[TaxBracket],
    ) -> BracketWalk {
        let mut remaining = taxable_income;
        let mut tax = Decimal::ZERO;
        let mut breakdown = Vec::new();

        for bracket in brackets {
            if remaining <= Decimal::ZERO {
                break;
            }

            let portion = match bracket.width() {
                Some(width) => remaining.min(width),
                None => remaining,
            };
            if portion <= Decimal::ZERO {
                continue;
            }

            let tax_in_bracket = portion * bracket.tax_rate;
            tax += tax_in_bracket;
            remaining -= portion;

            breakdown.push(TaxBreakdown {
                bracket_label: bracket.label(),
                income_in_bracket: portion,
                rate: bracket.tax_rate,
                tax_in_bracket,
            });
        }

        BracketWalk { tax, breakdown }
    }

    fn jurisdiction_tax(
        &self,
        taxable_income: Decimal,
        jurisdiction_code: &str,
    ) -> Decimal {
        let rate = match self.rules.jurisdiction_rate(jurisdiction_code) {
            Some(rate) => rate,
            None => {
                warn!(
                    jurisdiction_code,
                    "unknown jurisdiction code, no jurisdiction tax applied"
                );
                Decimal::ZERO
            }
        };
        taxable_income * rate
    }

    /// FICA is levied on gross income; deductions do not reduce it.
    fn fica_tax(
        &self,
        gross_income: Decimal,
        status: FilingStatus,
        fica: &FicaConstants,
    ) -> FicaBreakdown {
        let threshold = fica.additional_medicare_threshold(status);

        FicaBreakdown {
            social_security: gross_income.min(fica.ss_wage_base) * fica.ss_tax_rate,
            medicare: gross_income * fica.medicare_tax_rate,
            additional_medicare: max(gross_income - threshold, Decimal::ZERO)
                * fica.additional_medicare_rate,
        }
    }

    /// Total tax as a percentage of gross income.
    fn effective_rate(
        &self,
        total_tax: Decimal,
        gross_income: Decimal,
    ) -> Decimal {
        if gross_income > Decimal::ZERO {
            total_tax / gross_income * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    /// Rate of the bracket containing `taxable_income`, falling back to the
    /// last bracket's rate.
    fn marginal_rate(
        &self,
        taxable_income: Decimal,
        brackets: &[TaxBracket],
    ) -> Decimal {
        brackets
            .iter()
            .find(|b| b.contains(taxable_income))
            .or_else(|| brackets.last())
            .map_or(Decimal::ZERO, |b| b.tax_rate)
    }
}

fn validate_non_negative(
    field: &'static str,
    value: Decimal,
) -> Result<(), TaxCalculatorError> {
    if value < Decimal::ZERO {
        return Err(TaxCalculatorError::InvalidInput { field, value });
    }
    Ok(())
}
