use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One slice of a progressive bracket table.
///
/// `min_income` is inclusive and `max_income` exclusive. A `max_income` of
/// `None` marks the final, unbounded bracket of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            tax_rate,
        }
    }

    /// Amount of income this bracket can absorb, `None` when unbounded.
    pub fn width(&self) -> Option<Decimal> {
        self.max_income.map(|max| max - self.min_income)
    }

    /// Whether `income` falls in `[min_income, max_income)`.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income >= self.min_income && self.max_income.is_none_or(|max| income < max)
    }

    /// Display label for the bracket, e.g. `"22%"`.
    pub fn label(&self) -> String {
        format!("{}%", (self.tax_rate * Decimal::ONE_HUNDRED).normalize())
    }
}
