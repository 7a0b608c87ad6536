use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FilingStatus;

/// Caller-supplied inputs for a single calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationInput {
    /// Gross income for the year. Must be non-negative.
    pub gross_income: Decimal,

    pub filing_status: FilingStatus,

    /// Jurisdiction (state) code such as `"CA"`. Unknown codes carry no tax.
    pub jurisdiction_code: String,

    /// Total of the taxpayer's itemized deductions. Must be non-negative.
    /// The standard deduction is used instead whenever it is larger.
    pub itemized_deductions: Decimal,
}

impl TaxCalculationInput {
    pub fn new(
        gross_income: Decimal,
        filing_status: FilingStatus,
        jurisdiction_code: impl Into<String>,
        itemized_deductions: Decimal,
    ) -> Self {
        Self {
            gross_income,
            filing_status,
            jurisdiction_code: jurisdiction_code.into(),
            itemized_deductions,
        }
    }
}

/// Income and tax attributed to one federal bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// Bracket label, e.g. `"12%"`.
    pub bracket_label: String,
    pub income_in_bracket: Decimal,
    pub rate: Decimal,
    pub tax_in_bracket: Decimal,
}

/// FICA tax split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaBreakdown {
    pub social_security: Decimal,
    pub medicare: Decimal,
    pub additional_medicare: Decimal,
}

impl FicaBreakdown {
    pub fn total(&self) -> Decimal {
        self.social_security + self.medicare + self.additional_medicare
    }
}

/// Complete tax liability breakdown produced by the calculator.
///
/// Every figure is an exact decimal; nothing is rounded. The breakdown
/// entries sum to `taxable_income` and `federal_tax`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    pub gross_income: Decimal,

    /// Equal to gross income; adjustments to income are not modelled.
    pub adjusted_gross_income: Decimal,

    /// Larger of the standard deduction and the itemized total.
    pub effective_deduction: Decimal,

    /// Whether the itemized total was larger than the standard deduction.
    pub used_itemized_deduction: bool,

    pub taxable_income: Decimal,
    pub federal_tax: Decimal,
    pub jurisdiction_tax: Decimal,
    pub fica_tax: Decimal,
    pub fica: FicaBreakdown,
    pub total_tax: Decimal,

    /// Total tax as a percentage of gross income (0 for zero income).
    pub effective_rate: Decimal,

    /// Rate of the bracket holding the last dollar of taxable income, as a
    /// percentage.
    pub marginal_rate: Decimal,

    pub after_tax_income: Decimal,
    pub breakdown: Vec<TaxBreakdown>,
}
