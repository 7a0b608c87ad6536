//! Deduction suggestions from income and occupation.
//!
//! The advisor walks a fixed list of [`DeductionRule`]s and returns a
//! [`DeductionSuggestion`] for every rule whose trigger matches, in the order
//! the rules are declared. Estimated amounts are `min(ceiling, income * rate)`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::calculations::common::capped_share;
use crate::models::{DeductionCategory, DeductionSuggestion, OccupationCategory};

/// When a deduction rule applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleTrigger {
    Always,
    /// Income strictly greater than the amount.
    IncomeAbove(Decimal),
    OccupationIn(Vec<OccupationCategory>),
}

impl RuleTrigger {
    pub fn matches(
        &self,
        income: Decimal,
        occupation: OccupationCategory,
    ) -> bool {
        match self {
            Self::Always => true,
            Self::IncomeAbove(threshold) => income > *threshold,
            Self::OccupationIn(occupations) => occupations.contains(&occupation),
        }
    }
}

/// A single entry in the advisor's rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionRule {
    pub name: &'static str,
    pub category: DeductionCategory,
    pub description: &'static str,
    pub requirements: &'static [&'static str],
    pub trigger: RuleTrigger,
    pub rate: Decimal,
    pub ceiling: Decimal,
}

impl DeductionRule {
    fn suggestion(
        &self,
        income: Decimal,
    ) -> DeductionSuggestion {
        DeductionSuggestion {
            name: self.name.to_string(),
            estimated_amount: capped_share(income, self.rate, self.ceiling),
            category: self.category,
            description: self.description.to_string(),
            requirements: self.requirements.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// Proposes likely-eligible deductions.
///
/// Stateless apart from its rule table; `suggest` is pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeductionAdvisor {
    rules: Vec<DeductionRule>,
}

impl DeductionAdvisor {
    pub fn new(rules: Vec<DeductionRule>) -> Self {
        Self { rules }
    }

    /// Home office, professional development and computer equipment rules.
    pub fn standard_rules() -> Vec<DeductionRule> {
        vec![
            DeductionRule {
                name: "Home Office Deduction",
                category: DeductionCategory::Business,
                description: "Deduct expenses for the business use of your home",
                requirements: &[
                    "Exclusive business use",
                    "Regular business use",
                    "Principal place of business",
                ],
                trigger: RuleTrigger::IncomeAbove(dec!(30000)),
                rate: dec!(0.02),
                ceiling: dec!(1500),
            },
            DeductionRule {
                name: "Professional Development",
                category: DeductionCategory::Education,
                description: "Courses, certifications, and training related to your work",
                requirements: &[
                    "Work-related",
                    "Maintains or improves job skills",
                    "Required by employer or law",
                ],
                trigger: RuleTrigger::Always,
                rate: dec!(0.015),
                ceiling: dec!(2000),
            },
            DeductionRule {
                name: "Computer & Equipment",
                category: DeductionCategory::Business,
                description: "Computers, software, and equipment used for business",
                requirements: &[
                    "Business use",
                    "Necessary for work",
                    "Not reimbursed by employer",
                ],
                trigger: RuleTrigger::OccupationIn(vec![
                    OccupationCategory::Technology,
                    OccupationCategory::Consulting,
                ]),
                rate: dec!(0.025),
                ceiling: dec!(3000),
            },
        ]
    }

    pub fn rules(&self) -> &[DeductionRule] {
        &self.rules
    }

    /// Returns a suggestion for every rule that matches, in rule order.
    pub fn suggest(
        &self,
        income: Decimal,
        occupation: OccupationCategory,
    ) -> Vec<DeductionSuggestion> {
        let suggestions: Vec<_> = self
            .rules
            .iter()
            .filter(|rule| rule.trigger.matches(income, occupation))
            .map(|rule| rule.suggestion(income))
            .collect();

        debug!(
            %income,
            occupation = occupation.as_str(),
            count = suggestions.len(),
            "deductions suggested"
        );

        suggestions
    }
}

impl Default for DeductionAdvisor {
    fn default() -> Self {
        Self::new(Self::standard_rules())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn amounts(suggestions: &[DeductionSuggestion]) -> Vec<(&str, Decimal)> {
        suggestions
            .iter()
            .map(|s| (s.name.as_str(), s.estimated_amount))
            .collect()
    }

    // =========================================================================
    // RuleTrigger tests
    // =========================================================================

    #[test]
    fn income_above_is_strict() {
        let trigger = RuleTrigger::IncomeAbove(dec!(30000));

        assert!(!trigger.matches(dec!(30000), OccupationCategory::Other));
        assert!(trigger.matches(dec!(30000.01), OccupationCategory::Other));
    }

    #[test]
    fn occupation_in_matches_listed_occupations_only() {
        let trigger = RuleTrigger::OccupationIn(vec![OccupationCategory::Technology]);

        assert!(trigger.matches(dec!(0), OccupationCategory::Technology));
        assert!(!trigger.matches(dec!(0), OccupationCategory::Healthcare));
    }

    // =========================================================================
    // suggest tests
    // =========================================================================

    #[test]
    fn technology_at_80000_gets_all_three() {
        let advisor = DeductionAdvisor::default();

        let suggestions = advisor.suggest(dec!(80000), OccupationCategory::Technology);

        assert_eq!(
            amounts(&suggestions),
            vec![
                ("Home Office Deduction", dec!(1500)),
                ("Professional Development", dec!(1200)),
                ("Computer & Equipment", dec!(2000)),
            ]
        );
        assert_eq!(suggestions[0].category, DeductionCategory::Business);
        assert_eq!(suggestions[1].category, DeductionCategory::Education);
        assert_eq!(suggestions[2].category, DeductionCategory::Business);
    }

    #[test]
    fn low_income_other_occupation_gets_professional_development_only() {
        let advisor = DeductionAdvisor::default();

        let suggestions = advisor.suggest(dec!(20000), OccupationCategory::Healthcare);

        assert_eq!(amounts(&suggestions), vec![("Professional Development", dec!(300))]);
    }

    #[test]
    fn consulting_below_home_office_threshold() {
        let advisor = DeductionAdvisor::default();

        let suggestions = advisor.suggest(dec!(30000), OccupationCategory::Consulting);

        assert_eq!(
            amounts(&suggestions),
            vec![
                ("Professional Development", dec!(450)),
                ("Computer & Equipment", dec!(750)),
            ]
        );
    }

    #[test]
    fn high_income_amounts_are_capped() {
        let advisor = DeductionAdvisor::default();

        let suggestions = advisor.suggest(dec!(1000000), OccupationCategory::Consulting);

        assert_eq!(
            amounts(&suggestions),
            vec![
                ("Home Office Deduction", dec!(1500)),
                ("Professional Development", dec!(2000)),
                ("Computer & Equipment", dec!(3000)),
            ]
        );
    }

    #[test]
    fn zero_income_still_suggests_professional_development() {
        let advisor = DeductionAdvisor::default();

        let suggestions = advisor.suggest(dec!(0), OccupationCategory::Other);

        assert_eq!(amounts(&suggestions), vec![("Professional Development", dec!(0))]);
    }

    #[test]
    fn negative_income_never_gives_negative_amounts() {
        let advisor = DeductionAdvisor::default();

        let suggestions = advisor.suggest(dec!(-1000), OccupationCategory::Technology);

        assert_eq!(
            amounts(&suggestions),
            vec![
                ("Professional Development", dec!(0)),
                ("Computer & Equipment", dec!(0)),
            ]
        );
    }

    #[test]
    fn free_text_consultant_at_20000() {
        let advisor = DeductionAdvisor::default();
        let occupation = OccupationCategory::parse("consultant");

        let suggestions = advisor.suggest(dec!(20000), occupation);

        assert_eq!(occupation, OccupationCategory::Consulting);
        assert_eq!(
            amounts(&suggestions),
            vec![
                ("Professional Development", dec!(300)),
                ("Computer & Equipment", dec!(500)),
            ]
        );
        assert!(suggestions.iter().all(|s| s.name != "Home Office Deduction"));
    }

    #[test]
    fn suggestions_carry_description_and_requirements() {
        let advisor = DeductionAdvisor::default();

        let suggestions = advisor.suggest(dec!(50000), OccupationCategory::Sales);
        let home_office = &suggestions[0];

        assert_eq!(home_office.name, "Home Office Deduction");
        assert_eq!(
            home_office.description,
            "Deduct expenses for the business use of your home"
        );
        assert_eq!(
            home_office.requirements,
            vec![
                "Exclusive business use".to_string(),
                "Regular business use".to_string(),
                "Principal place of business".to_string(),
            ]
        );
    }

    #[test]
    fn suggest_is_idempotent() {
        let advisor = DeductionAdvisor::default();

        let first = advisor.suggest(dec!(64321.09), OccupationCategory::Technology);
        let second = advisor.suggest(dec!(64321.09), OccupationCategory::Technology);

        assert_eq!(first, second);
    }

    #[test]
    fn custom_rule_table_is_used() {
        let advisor = DeductionAdvisor::new(vec![DeductionRule {
            name: "Union Dues",
            category: DeductionCategory::Business,
            description: "Dues paid to a labor union",
            requirements: &["Paid in the tax year"],
            trigger: RuleTrigger::OccupationIn(vec![OccupationCategory::Trades]),
            rate: dec!(0.01),
            ceiling: dec!(800),
        }]);

        assert!(advisor.suggest(dec!(60000), OccupationCategory::Technology).is_empty());
        assert_eq!(
            amounts(&advisor.suggest(dec!(60000), OccupationCategory::Trades)),
            vec![("Union Dues", dec!(600))]
        );
    }
}
