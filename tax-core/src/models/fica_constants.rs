use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FilingStatus;

/// Payroll (Social Security + Medicare) constants for one tax year.
///
/// The additional Medicare threshold only distinguishes married filing
/// jointly from every other status. Married filing separately has its own,
/// lower threshold under current law; that split is not modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FicaConstants {
    /// Maximum gross income subject to Social Security tax.
    pub ss_wage_base: Decimal,

    /// Employee Social Security rate, e.g. 6.2%.
    pub ss_tax_rate: Decimal,

    /// Employee Medicare rate, e.g. 1.45%.
    pub medicare_tax_rate: Decimal,

    /// Additional Medicare rate applied above the threshold, e.g. 0.9%.
    pub additional_medicare_rate: Decimal,

    /// Additional Medicare threshold for married filing jointly.
    pub additional_medicare_threshold_joint: Decimal,

    /// Additional Medicare threshold for every other filing status.
    pub additional_medicare_threshold_other: Decimal,
}

impl FicaConstants {
    pub fn additional_medicare_threshold(
        &self,
        filing_status: FilingStatus,
    ) -> Decimal {
        match filing_status {
            FilingStatus::MarriedFilingJointly => self.additional_medicare_threshold_joint,
            FilingStatus::Single
            | FilingStatus::MarriedFilingSeparately
            | FilingStatus::HeadOfHousehold => self.additional_medicare_threshold_other,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn constants() -> FicaConstants {
        FicaConstants {
            ss_wage_base: dec!(160200),
            ss_tax_rate: dec!(0.062),
            medicare_tax_rate: dec!(0.0145),
            additional_medicare_rate: dec!(0.009),
            additional_medicare_threshold_joint: dec!(250000),
            additional_medicare_threshold_other: dec!(200000),
        }
    }

    #[test]
    fn joint_filers_use_joint_threshold() {
        let result = constants().additional_medicare_threshold(FilingStatus::MarriedFilingJointly);

        assert_eq!(result, dec!(250000));
    }

    #[test]
    fn every_other_status_uses_other_threshold() {
        let fica = constants();

        for status in [
            FilingStatus::Single,
            FilingStatus::MarriedFilingSeparately,
            FilingStatus::HeadOfHousehold,
        ] {
            assert_eq!(fica.additional_medicare_threshold(status), dec!(200000));
        }
    }
}
