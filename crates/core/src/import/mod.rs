//! Ledger export import.
//!
//! Turns an uploaded trial-balance export into `TrialBalanceEntry` values.
//! Rows that do not yield an account and an amount are dropped without being
//! reported.

pub mod amount;
pub mod columns;
pub mod delimited;
pub mod error;
pub mod spreadsheet;

use std::path::Path;

pub use columns::{ColumnMap, rows_to_entries};
pub use error::ImportError;

use crate::trial_balance::TrialBalanceEntry;

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFormat {
    /// Comma/semicolon/tab separated text, delimiter sniffed.
    Delimited,
    /// Tab separated text.
    Tsv,
    /// Excel or OpenDocument workbook.
    Spreadsheet,
}

impl LedgerFormat {
    /// Determines the format from a filename's extension.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::UnsupportedFormat` for unknown or missing
    /// extensions.
    pub fn from_filename(filename: &str) -> Result<Self, ImportError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Delimited),
            "tsv" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(ImportError::unsupported_format(extension)),
        }
    }
}

/// Parses an uploaded ledger export.
///
/// # Errors
///
/// Returns `ImportError::UnsupportedFormat` if the extension is unknown and
/// `ImportError::Malformed` if the file cannot be decoded.
pub fn parse_ledger(bytes: &[u8], filename: &str) -> Result<Vec<TrialBalanceEntry>, ImportError> {
    let rows = match LedgerFormat::from_filename(filename)? {
        LedgerFormat::Delimited => delimited::read_rows(bytes, None)?,
        LedgerFormat::Tsv => delimited::read_rows(bytes, Some(b'\t'))?,
        LedgerFormat::Spreadsheet => spreadsheet::read_rows(bytes)?,
    };
    Ok(rows_to_entries(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("tb.csv", LedgerFormat::Delimited)]
    #[case("TB.CSV", LedgerFormat::Delimited)]
    #[case("export.txt", LedgerFormat::Delimited)]
    #[case("export.tsv", LedgerFormat::Tsv)]
    #[case("jan.xlsx", LedgerFormat::Spreadsheet)]
    #[case("jan.xls", LedgerFormat::Spreadsheet)]
    #[case("jan.ods", LedgerFormat::Spreadsheet)]
    fn test_format_from_filename(#[case] filename: &str, #[case] expected: LedgerFormat) {
        assert_eq!(
            LedgerFormat::from_filename(filename).expect("supported"),
            expected
        );
    }

    #[rstest]
    #[case("tb.pdf")]
    #[case("tb")]
    #[case("")]
    #[case("archive.csv.zip")]
    fn test_unsupported_format(#[case] filename: &str) {
        assert!(matches!(
            LedgerFormat::from_filename(filename),
            Err(ImportError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_parse_csv_with_header() {
        let csv = "Account Code,Account Name,Debit,Credit\n\
                   1000,Cash,\"1,500.00\",\n\
                   4000,Sales,,\"1,500.00\"\n";
        let entries = parse_ledger(csv.as_bytes(), "tb.csv").expect("parse");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].account_code, "1000");
        assert_eq!(entries[0].debit, dec!(1500));
        assert_eq!(entries[0].credit, Decimal::ZERO);
        assert_eq!(entries[1].account_name, "Sales");
        assert_eq!(entries[1].credit, dec!(1500));
    }

    #[test]
    fn test_parse_tsv_without_header() {
        let tsv = "1000\tCash\t250\t\n2000\tAccounts Payable\t\t250\n";
        let entries = parse_ledger(tsv.as_bytes(), "tb.tsv").expect("parse");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].credit, dec!(250));
    }

    #[test]
    fn test_malformed_rows_are_dropped_silently() {
        // Malformed rows are excluded without a finding. Changing this is a
        // behaviour change and must update this test.
        let csv = "Code,Name,Debit,Credit\n\
                   1000,Cash,100,\n\
                   ,,,\n\
                   1100,Receivable,not-a-number,\n\
                   ,,50,\n\
                   4000,Sales,,100\n";
        let entries = parse_ledger(csv.as_bytes(), "tb.csv").expect("parse");

        let names: Vec<&str> = entries.iter().map(|e| e.account_name.as_str()).collect();
        assert_eq!(names, vec!["Cash", "Sales"]);
    }

    #[test]
    fn test_out_of_range_amounts_are_dropped() {
        let csv = "Code,Name,Debit,Credit\n\
                   1000,Cash,79228162514264337593543950335,\n\
                   1001,Bank,79228162514264337593543950335,\n\
                   4000,Sales,,250\n";
        let entries = parse_ledger(csv.as_bytes(), "tb.csv").expect("parse");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].account_name, "Sales");
    }

    #[test]
    fn test_parse_xlsx_workbook() {
        let workbook = include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/trial_balance.xlsx"
        ));
        let entries = parse_ledger(workbook, "January.XLSX").expect("parse");

        assert_eq!(entries.len(), 2, "total row is dropped");
        assert_eq!(entries[0].account_code, "1000");
        assert_eq!(entries[0].account_name, "Cash");
        assert_eq!(entries[0].debit, dec!(1500.5));
        assert_eq!(entries[0].credit, Decimal::ZERO);
        assert_eq!(entries[1].account_code, "4000");
        assert_eq!(entries[1].account_name, "Sales Revenue");
        assert_eq!(entries[1].credit, dec!(1500.5));
    }

    #[test]
    fn test_corrupt_spreadsheet_is_malformed() {
        let result = parse_ledger(b"PK\x03\x04garbage", "tb.xlsx");
        assert!(matches!(result, Err(ImportError::Malformed(_))));
    }
}
