mod deduction;
mod fica_constants;
mod filing_status;
mod tax_bracket;
mod tax_calculation;

pub use deduction::{DeductionCategory, DeductionSuggestion, OccupationCategory};
pub use fica_constants::FicaConstants;
pub use filing_status::FilingStatus;
pub use tax_bracket::TaxBracket;
pub use tax_calculation::{
    FicaBreakdown, TaxBreakdown, TaxCalculationInput, TaxCalculationResult,
};
