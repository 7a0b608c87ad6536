pub mod calculations;
pub mod models;
pub mod rules;

pub use calculations::{DeductionAdvisor, TaxCalculator, TaxCalculatorError};
pub use models::*;
pub use rules::{FilingStatusTable, RuleTableError, RuleTableStore};
