use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Occupation groups the deduction advisor can reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OccupationCategory {
    Technology,
    Consulting,
    Healthcare,
    Education,
    Trades,
    Creative,
    Sales,
    Other,
}

impl OccupationCategory {
    pub fn all() -> &'static [OccupationCategory] {
        &[
            Self::Technology,
            Self::Consulting,
            Self::Healthcare,
            Self::Education,
            Self::Trades,
            Self::Creative,
            Self::Sales,
            Self::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technology => "technology",
            Self::Consulting => "consulting",
            Self::Healthcare => "healthcare",
            Self::Education => "education",
            Self::Trades => "trades",
            Self::Creative => "creative",
            Self::Sales => "sales",
            Self::Other => "other",
        }
    }

    /// Maps a free-text occupation onto a category.
    ///
    /// Exact category names match first; otherwise anything mentioning
    /// "tech" is Technology and anything mentioning "consult" is Consulting.
    /// Everything else falls back to `Other`.
    pub fn parse(s: &str) -> Self {
        let normalized = s.trim().to_ascii_lowercase();

        if let Some(category) = Self::all()
            .iter()
            .find(|c| c.as_str() == normalized)
        {
            return *category;
        }

        if normalized.contains("tech") || normalized.contains("software") {
            Self::Technology
        } else if normalized.contains("consult") {
            Self::Consulting
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for OccupationCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeductionCategory {
    Business,
    Education,
}

impl fmt::Display for DeductionCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Business => f.write_str("Business"),
            Self::Education => f.write_str("Education"),
        }
    }
}

/// A deduction the taxpayer is likely eligible for, with a rough amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionSuggestion {
    pub name: String,
    pub estimated_amount: Decimal,
    pub category: DeductionCategory,
    pub description: String,
    pub requirements: Vec<String>,
}
