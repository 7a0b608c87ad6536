use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tax_core::{
    FicaConstants, FilingStatus, FilingStatusTable, RuleTableError, RuleTableStore, TaxBracket,
};
use thiserror::Error;
use tracing::debug;

pub const BRACKETS_FILE: &str = "tax_brackets.csv";
pub const STANDARD_DEDUCTIONS_FILE: &str = "standard_deductions.csv";
pub const JURISDICTION_RATES_FILE: &str = "jurisdiction_rates.csv";
pub const FICA_FILE: &str = "fica.csv";

/// Errors that can occur when loading rule tables.
#[derive(Debug, Error)]
pub enum RuleTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unrecognised filing status '{0}'")]
    InvalidFilingStatus(String),

    #[error("no standard deduction for {status} in tax year {tax_year}")]
    MissingStandardDeduction {
        tax_year: i32,
        status: FilingStatus,
    },

    #[error("more than one standard deduction for {status} in tax year {tax_year}")]
    DuplicateStandardDeduction {
        tax_year: i32,
        status: FilingStatus,
    },

    #[error("more than one rate for jurisdiction '{code}' in tax year {tax_year}")]
    DuplicateJurisdiction { tax_year: i32, code: String },

    #[error("no FICA constants for tax year {0}")]
    MissingFica(i32),

    #[error("more than one set of FICA constants for tax year {0}")]
    DuplicateFica(i32),

    #[error("invalid rule tables: {0}")]
    Rules(#[from] RuleTableError),
}

impl From<csv::Error> for RuleTableLoaderError {
    fn from(err: csv::Error) -> Self {
        RuleTableLoaderError::CsvParse(err.to_string())
    }
}

/// A row of `tax_brackets.csv`. An empty `max_income` is an unbounded bracket.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub filing_status: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

/// A row of `standard_deductions.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StandardDeductionRecord {
    pub tax_year: i32,
    pub filing_status: String,
    pub amount: Decimal,
}

/// A row of `jurisdiction_rates.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JurisdictionRateRecord {
    pub tax_year: i32,
    pub code: String,
    pub rate: Decimal,
}

/// A row of `fica.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FicaRecord {
    pub tax_year: i32,
    pub ss_wage_base: Decimal,
    pub ss_tax_rate: Decimal,
    pub medicare_tax_rate: Decimal,
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold_joint: Decimal,
    pub additional_medicare_threshold_other: Decimal,
}

impl From<&FicaRecord> for FicaConstants {
    fn from(record: &FicaRecord) -> Self {
        FicaConstants {
            ss_wage_base: record.ss_wage_base,
            ss_tax_rate: record.ss_tax_rate,
            medicare_tax_rate: record.medicare_tax_rate,
            additional_medicare_rate: record.additional_medicare_rate,
            additional_medicare_threshold_joint: record.additional_medicare_threshold_joint,
            additional_medicare_threshold_other: record.additional_medicare_threshold_other,
        }
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn parse_filing_status(code: &str) -> Result<FilingStatus, RuleTableLoaderError> {
    FilingStatus::parse(code)
        .ok_or_else(|| RuleTableLoaderError::InvalidFilingStatus(code.to_string()))
}

/// The raw rows of one rule table directory, before they are filtered to a
/// tax year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTableRecords {
    pub brackets: Vec<TaxBracketRecord>,
    pub standard_deductions: Vec<StandardDeductionRecord>,
    pub jurisdiction_rates: Vec<JurisdictionRateRecord>,
    pub fica: Vec<FicaRecord>,
}

/// Loader for rule tables stored as versioned CSV files.
///
/// A rule table directory holds four files: [`BRACKETS_FILE`],
/// [`STANDARD_DEDUCTIONS_FILE`], [`JURISDICTION_RATES_FILE`] and
/// [`FICA_FILE`]. Every row carries a `tax_year`; rows for other years are
/// ignored, so one directory may hold several years.
pub struct RuleTableLoader;

impl RuleTableLoader {
    /// Parse CSV rows of any record type from a reader.
    ///
    /// Whitespace around headers and values is trimmed.
    pub fn parse<T, R>(reader: R) -> Result<Vec<T>, RuleTableLoaderError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: T = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Read all four rule table files from `dir`.
    pub fn read_dir(dir: &Path) -> Result<RuleTableRecords, RuleTableLoaderError> {
        Ok(RuleTableRecords {
            brackets: Self::parse_file(&dir.join(BRACKETS_FILE))?,
            standard_deductions: Self::parse_file(&dir.join(STANDARD_DEDUCTIONS_FILE))?,
            jurisdiction_rates: Self::parse_file(&dir.join(JURISDICTION_RATES_FILE))?,
            fica: Self::parse_file(&dir.join(FICA_FILE))?,
        })
    }

    /// Read the rule table files in `dir` and build a validated store for
    /// `tax_year`.
    pub fn load_dir(
        dir: &Path,
        tax_year: i32,
    ) -> Result<RuleTableStore, RuleTableLoaderError> {
        let records = Self::read_dir(dir)?;
        let store = Self::build(tax_year, &records)?;

        debug!(dir = %dir.display(), tax_year, "rule tables loaded");

        Ok(store)
    }

    /// Build a validated store for `tax_year` from parsed rows.
    ///
    /// Brackets are sorted by `min_income` within each filing status, so row
    /// order in the file does not matter.
    pub fn build(
        tax_year: i32,
        records: &RuleTableRecords,
    ) -> Result<RuleTableStore, RuleTableLoaderError> {
        let brackets = Self::build_brackets(tax_year, &records.brackets)?;
        let standard_deductions =
            Self::build_standard_deductions(tax_year, &records.standard_deductions)?;
        let jurisdiction_rates =
            Self::build_jurisdiction_rates(tax_year, &records.jurisdiction_rates)?;
        let fica = Self::build_fica(tax_year, &records.fica)?;

        Ok(RuleTableStore::new(
            tax_year,
            brackets,
            standard_deductions,
            jurisdiction_rates,
            fica,
        )?)
    }

    fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RuleTableLoaderError> {
        let file = File::open(path).map_err(|source| RuleTableLoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(file)
    }

    fn build_brackets(
        tax_year: i32,
        records: &[TaxBracketRecord],
    ) -> Result<FilingStatusTable<Vec<TaxBracket>>, RuleTableLoaderError> {
        let mut grouped: BTreeMap<FilingStatus, Vec<TaxBracket>> = BTreeMap::new();

        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            let status = parse_filing_status(&record.filing_status)?;
            grouped.entry(status).or_default().push(TaxBracket::new(
                record.min_income,
                record.max_income,
                record.rate,
            ));
        }

        FilingStatusTable::try_from_fn(|status| {
            let mut brackets = grouped.remove(&status).unwrap_or_default();
            brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            Ok(brackets)
        })
    }

    fn build_standard_deductions(
        tax_year: i32,
        records: &[StandardDeductionRecord],
    ) -> Result<FilingStatusTable<Decimal>, RuleTableLoaderError> {
        let mut amounts: BTreeMap<FilingStatus, Decimal> = BTreeMap::new();

        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            let status = parse_filing_status(&record.filing_status)?;
            if amounts.insert(status, record.amount).is_some() {
                return Err(RuleTableLoaderError::DuplicateStandardDeduction { tax_year, status });
            }
        }

        FilingStatusTable::try_from_fn(|status| {
            amounts
                .get(&status)
                .copied()
                .ok_or(RuleTableLoaderError::MissingStandardDeduction { tax_year, status })
        })
    }

    fn build_jurisdiction_rates(
        tax_year: i32,
        records: &[JurisdictionRateRecord],
    ) -> Result<BTreeMap<String, Decimal>, RuleTableLoaderError> {
        let mut rates = BTreeMap::new();

        for record in records.iter().filter(|r| r.tax_year == tax_year) {
            let code = record.code.trim().to_ascii_uppercase();
            if rates.insert(code.clone(), record.rate).is_some() {
                return Err(RuleTableLoaderError::DuplicateJurisdiction { tax_year, code });
            }
        }

        Ok(rates)
    }

    fn build_fica(
        tax_year: i32,
        records: &[FicaRecord],
    ) -> Result<FicaConstants, RuleTableLoaderError> {
        let mut matching = records.iter().filter(|r| r.tax_year == tax_year);

        let record = matching
            .next()
            .ok_or(RuleTableLoaderError::MissingFica(tax_year))?;
        if matching.next().is_some() {
            return Err(RuleTableLoaderError::DuplicateFica(tax_year));
        }

        Ok(FicaConstants::from(record))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const BRACKETS_CSV: &str = "\
tax_year,filing_status,min_income,max_income,rate
2024,S,0,11000,0.10
2024,S,11000,,0.12
2024,MFJ,0,22000,0.10
2024,MFJ,22000,,0.12
2024,MFS,0,11000,0.10
2024,MFS,11000,,0.12
2024,HOH,0,15700,0.10
2024,HOH,15700,,0.12
2025,S,0,11925,0.10
";

    const STANDARD_DEDUCTIONS_CSV: &str = "\
tax_year,filing_status,amount
2024,S,13850
2024,MFJ,27700
2024,MFS,13850
2024,HOH,20800
";

    const JURISDICTION_RATES_CSV: &str = "\
tax_year,code,rate
2024,CA,0.093
2024,tx,0.00
2023,NY,0.0685
";

    const FICA_CSV: &str = "\
tax_year,ss_wage_base,ss_tax_rate,medicare_tax_rate,additional_medicare_rate,additional_medicare_threshold_joint,additional_medicare_threshold_other
2024,160200,0.062,0.0145,0.009,250000,200000
";

    fn records() -> RuleTableRecords {
        RuleTableRecords {
            brackets: RuleTableLoader::parse(BRACKETS_CSV.as_bytes()).unwrap(),
            standard_deductions: RuleTableLoader::parse(STANDARD_DEDUCTIONS_CSV.as_bytes())
                .unwrap(),
            jurisdiction_rates: RuleTableLoader::parse(JURISDICTION_RATES_CSV.as_bytes())
                .unwrap(),
            fica: RuleTableLoader::parse(FICA_CSV.as_bytes()).unwrap(),
        }
    }

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn parse_bracket_row() {
        let csv = "tax_year,filing_status,min_income,max_income,rate\n2024,S,0,11000,0.10";

        let records: Vec<TaxBracketRecord> =
            RuleTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![TaxBracketRecord {
                tax_year: 2024,
                filing_status: "S".to_string(),
                min_income: dec!(0),
                max_income: Some(dec!(11000)),
                rate: dec!(0.10),
            }]
        );
    }

    #[test]
    fn parse_empty_max_income_is_unbounded() {
        let csv = "tax_year,filing_status,min_income,max_income,rate\n2024,S,578125,,0.37";

        let records: Vec<TaxBracketRecord> =
            RuleTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].max_income, None);
        assert_eq!(records[0].rate, dec!(0.37));
    }

    #[test]
    fn parse_trims_whitespace() {
        let csv = "tax_year , code , rate\n 2024 , CA , 0.093 ";

        let records: Vec<JurisdictionRateRecord> =
            RuleTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].code, "CA");
        assert_eq!(records[0].rate, dec!(0.093));
    }

    #[test]
    fn parse_missing_column_is_csv_error() {
        let csv = "tax_year,filing_status,min_income\n2024,S,0";

        let err = RuleTableLoader::parse::<TaxBracketRecord, _>(csv.as_bytes())
            .expect_err("Should fail for missing column");

        let RuleTableLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(msg.contains("missing field"), "got: {msg}");
    }

    #[test]
    fn parse_bad_decimal_is_csv_error() {
        let csv = "tax_year,code,rate\n2024,CA,abc";

        let err = RuleTableLoader::parse::<JurisdictionRateRecord, _>(csv.as_bytes())
            .expect_err("Should fail for invalid decimal");

        assert!(matches!(err, RuleTableLoaderError::CsvParse(_)));
    }

    #[test]
    fn parse_header_only_is_empty() {
        let csv = "tax_year,code,rate\n";

        let records: Vec<JurisdictionRateRecord> =
            RuleTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    // =========================================================================
    // build tests
    // =========================================================================

    #[test]
    fn build_filters_to_requested_year() {
        let store = RuleTableLoader::build(2024, &records()).unwrap();

        assert_eq!(store.tax_year(), 2024);
        assert_eq!(store.brackets_for(FilingStatus::Single).len(), 2);
        assert_eq!(store.brackets_for(FilingStatus::Single)[0].max_income, Some(dec!(11000)));
        assert_eq!(store.standard_deduction_for(FilingStatus::HeadOfHousehold), dec!(20800));
        assert_eq!(store.jurisdiction_rate("NY"), None);
    }

    #[test]
    fn build_uppercases_jurisdiction_codes() {
        let store = RuleTableLoader::build(2024, &records()).unwrap();

        assert_eq!(store.jurisdiction_codes().collect::<Vec<_>>(), vec!["CA", "TX"]);
    }

    #[test]
    fn build_sorts_brackets_by_min_income() {
        let mut records = records();
        records.brackets.swap(0, 1);

        let store = RuleTableLoader::build(2024, &records).unwrap();

        let mins: Vec<_> = store
            .brackets_for(FilingStatus::Single)
            .iter()
            .map(|b| b.min_income)
            .collect();
        assert_eq!(mins, vec![dec!(0), dec!(11000)]);
    }

    #[test]
    fn build_year_without_rows_fails_validation() {
        let err = RuleTableLoader::build(2030, &records()).unwrap_err();

        assert!(matches!(
            err,
            RuleTableLoaderError::MissingStandardDeduction { tax_year: 2030, .. }
        ));
    }

    #[test]
    fn build_missing_brackets_for_status() {
        let mut records = records();
        records.brackets.retain(|r| r.filing_status != "HOH");

        let err = RuleTableLoader::build(2024, &records).unwrap_err();

        assert!(matches!(
            err,
            RuleTableLoaderError::Rules(RuleTableError::NoBrackets(FilingStatus::HeadOfHousehold))
        ));
    }

    #[test]
    fn build_unknown_filing_status() {
        let mut records = records();
        records.brackets[0].filing_status = "QSS".to_string();

        let err = RuleTableLoader::build(2024, &records).unwrap_err();

        match err {
            RuleTableLoaderError::InvalidFilingStatus(status) => assert_eq!(status, "QSS"),
            other => panic!("expected InvalidFilingStatus, got {other:?}"),
        }
    }

    #[test]
    fn build_duplicate_standard_deduction() {
        let mut records = records();
        let duplicate = records.standard_deductions[0].clone();
        records.standard_deductions.push(duplicate);

        let err = RuleTableLoader::build(2024, &records).unwrap_err();

        assert!(matches!(
            err,
            RuleTableLoaderError::DuplicateStandardDeduction {
                status: FilingStatus::Single,
                ..
            }
        ));
    }

    #[test]
    fn build_duplicate_jurisdiction_differing_only_in_case() {
        let mut records = records();
        records.jurisdiction_rates.push(JurisdictionRateRecord {
            tax_year: 2024,
            code: "ca".to_string(),
            rate: dec!(0.05),
        });

        let err = RuleTableLoader::build(2024, &records).unwrap_err();

        match err {
            RuleTableLoaderError::DuplicateJurisdiction { code, .. } => assert_eq!(code, "CA"),
            other => panic!("expected DuplicateJurisdiction, got {other:?}"),
        }
    }

    #[test]
    fn build_missing_fica() {
        let mut records = records();
        records.fica.clear();

        let err = RuleTableLoader::build(2024, &records).unwrap_err();

        assert!(matches!(err, RuleTableLoaderError::MissingFica(2024)));
    }

    #[test]
    fn build_duplicate_fica() {
        let mut records = records();
        let duplicate = records.fica[0].clone();
        records.fica.push(duplicate);

        let err = RuleTableLoader::build(2024, &records).unwrap_err();

        assert!(matches!(err, RuleTableLoaderError::DuplicateFica(2024)));
    }

    #[test]
    fn build_rejects_gap_between_brackets() {
        let mut records = records();
        records.brackets[1].min_income = dec!(12000);

        let err = RuleTableLoader::build(2024, &records).unwrap_err();

        assert!(matches!(
            err,
            RuleTableLoaderError::Rules(RuleTableError::NonContiguousBrackets { .. })
        ));
    }

    #[test]
    fn read_dir_reports_missing_file() {
        let err = RuleTableLoader::read_dir(Path::new("/nonexistent/rules")).unwrap_err();

        match err {
            RuleTableLoaderError::Io { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/rules").join(BRACKETS_FILE));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
