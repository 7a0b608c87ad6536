use std::fmt;

use serde::{Deserialize, Serialize};

/// Taxpayer category selecting the bracket table and standard deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilingStatus {
    Single,
    #[serde(rename = "marriedJoint")]
    MarriedFilingJointly,
    #[serde(rename = "marriedSeparate")]
    MarriedFilingSeparately,
    HeadOfHousehold,
}

impl FilingStatus {
    pub fn all() -> &'static [FilingStatus] {
        &[
            FilingStatus::Single,
            FilingStatus::MarriedFilingJointly,
            FilingStatus::MarriedFilingSeparately,
            FilingStatus::HeadOfHousehold,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedFilingJointly => "Married Filing Jointly",
            Self::MarriedFilingSeparately => "Married Filing Separately",
            Self::HeadOfHousehold => "Head of Household",
        }
    }

    /// Parses a short code (`S`, `MFJ`, `MFS`, `HOH`) or the camelCase name
    /// used on the wire (`single`, `marriedJoint`, ...). Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "single" => Some(Self::Single),
            "mfj" | "marriedjoint" | "married_joint" => Some(Self::MarriedFilingJointly),
            "mfs" | "marriedseparate" | "married_separate" => {
                Some(Self::MarriedFilingSeparately)
            }
            "hoh" | "headofhousehold" | "head_of_household" => Some(Self::HeadOfHousehold),
            _ => None,
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}
