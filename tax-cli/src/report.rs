//! Plain-text rendering of calculation results and deduction suggestions.
//!
//! All amounts are rounded to cents here; the results themselves stay exact.

use std::fmt;

use tax_core::{DeductionSuggestion, TaxCalculationInput, TaxCalculationResult};

use crate::utils::{money_display, percent_display};

pub struct CalculationReport<'a> {
    pub input: &'a TaxCalculationInput,
    pub result: &'a TaxCalculationResult,
}

impl fmt::Display for CalculationReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let r = self.result;
        let deduction_kind = if r.used_itemized_deduction {
            "itemized"
        } else {
            "standard"
        };

        writeln!(f, "Filing status:       {}", self.input.filing_status)?;
        writeln!(f, "Jurisdiction:        {}", self.input.jurisdiction_code)?;
        writeln!(f, "Gross income:        {}", money_display(r.gross_income))?;
        writeln!(
            f,
            "Deduction:           {} ({deduction_kind})",
            money_display(r.effective_deduction)
        )?;
        writeln!(f, "Taxable income:      {}", money_display(r.taxable_income))?;
        writeln!(f)?;

        writeln!(f, "Federal brackets:")?;
        for line in &r.breakdown {
            writeln!(
                f,
                "  {:>4} on {:>12} = {:>10}",
                line.bracket_label,
                money_display(line.income_in_bracket),
                money_display(line.tax_in_bracket)
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Federal tax:         {}", money_display(r.federal_tax))?;
        writeln!(f, "Jurisdiction tax:    {}", money_display(r.jurisdiction_tax))?;
        writeln!(f, "Social security:     {}", money_display(r.fica.social_security))?;
        writeln!(f, "Medicare:            {}", money_display(r.fica.medicare))?;
        writeln!(
            f,
            "Additional medicare: {}",
            money_display(r.fica.additional_medicare)
        )?;
        writeln!(f, "FICA tax:            {}", money_display(r.fica_tax))?;
        writeln!(f, "Total tax:           {}", money_display(r.total_tax))?;
        writeln!(f, "Effective rate:      {}", percent_display(r.effective_rate))?;
        writeln!(f, "Marginal rate:       {}", percent_display(r.marginal_rate))?;
        write!(f, "After-tax income:    {}", money_display(r.after_tax_income))
    }
}

pub struct SuggestionReport<'a>(pub &'a [DeductionSuggestion]);

impl fmt::Display for SuggestionReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No deductions suggested.");
        }

        for (index, suggestion) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(
                f,
                "{} [{}]: about {}",
                suggestion.name,
                suggestion.category,
                money_display(suggestion.estimated_amount)
            )?;
            writeln!(f, "  {}", suggestion.description)?;
            for requirement in &suggestion.requirements {
                writeln!(f, "  - {requirement}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tax_core::{
        DeductionAdvisor, FilingStatus, OccupationCategory, RuleTableStore, TaxCalculator,
    };

    use super::*;

    #[test]
    fn calculation_report_single_california() {
        let rules = RuleTableStore::tax_year_2024();
        let input = TaxCalculationInput::new(dec!(75000), FilingStatus::Single, "CA", dec!(0));
        let result = TaxCalculator::new(&rules).calculate(&input).unwrap();

        let text = CalculationReport {
            input: &input,
            result: &result,
        }
        .to_string();

        let expected = "\
Filing status:       Single
Jurisdiction:        CA
Gross income:        75000.00
Deduction:           13850.00 (standard)
Taxable income:      61150.00

Federal brackets:
   10% on     11000.00 =    1100.00
   12% on     33725.00 =    4047.00
   22% on     16425.00 =    3613.50

Federal tax:         8760.50
Jurisdiction tax:    5686.95
Social security:     4650.00
Medicare:            1087.50
Additional medicare: 0.00
FICA tax:            5737.50
Total tax:           20184.95
Effective rate:      26.91%
Marginal rate:       22%
After-tax income:    54815.05";
        assert_eq!(text, expected);
    }

    #[test]
    fn suggestion_report_lists_requirements() {
        let suggestions =
            DeductionAdvisor::default().suggest(dec!(20000), OccupationCategory::Other);

        let text = SuggestionReport(&suggestions).to_string();

        let expected = "\
Professional Development [Education]: about 300.00
  Courses, certifications, and training related to your work
  - Work-related
  - Maintains or improves job skills
  - Required by employer or law
";
        assert_eq!(text, expected);
    }

    #[test]
    fn suggestion_report_empty() {
        assert_eq!(SuggestionReport(&[]).to_string(), "No deductions suggested.");
    }
}
