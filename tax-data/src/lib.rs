pub mod deductions;
mod loader;

pub use deductions::{DeductionRecord, DeductionRecordError, itemized_total};
pub use loader::{
    BRACKETS_FILE, FICA_FILE, FicaRecord, JURISDICTION_RATES_FILE, JurisdictionRateRecord,
    RuleTableLoader, RuleTableLoaderError, RuleTableRecords, STANDARD_DEDUCTIONS_FILE,
    StandardDeductionRecord, TaxBracketRecord,
};
