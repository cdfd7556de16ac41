// Import module - Kuvera capital gains exports and flat transaction tables (Excel/CSV)

pub mod csv_sheet;
pub mod excel_sheet;
pub mod flat_table;
pub mod kuvera;
pub mod validation;
mod file_detector;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::error::InputError;

pub use file_detector::{detect_layout, Layout};
pub use validation::{validate_rows, ValidRow, ValidationIssue, ValidationResult};

/// One sheet row as trimmed text cells. Empty cells are empty strings.
pub type SheetRow = Vec<String>;

/// A transaction row as found in the source, before any parsing.
///
/// Every field holds the cell text untouched apart from trimming, so that
/// validation can report exactly what was in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// Row number in the source sheet (1-indexed)
    pub row_number: usize,
    pub fund_name: String,
    pub isin: Option<String>,
    pub folio_number: Option<String>,
    /// Category as written in the input, if the layout carries one
    pub category: Option<String>,
    pub transaction_number: String,
    pub units: String,
    pub purchase_date: String,
    pub purchase_value: String,
    pub purchase_nav: String,
    pub redemption_date: String,
    pub redemption_value: String,
    pub redemption_nav: String,
    pub reported_stcg: String,
    pub reported_ltcg: String,
}

/// Read the first sheet of a workbook or a CSV file as text rows
pub fn read_sheet<P: AsRef<Path>>(path: P) -> Result<Vec<SheetRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(InputError::FileNotFound(path.to_path_buf()).into());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    match extension.as_str() {
        "xlsx" | "xls" | "xlsm" | "ods" => excel_sheet::read_first_sheet(path),
        "csv" | "txt" => csv_sheet::read_csv_sheet(path),
        _ => Err(InputError::UnsupportedFormat(if extension.is_empty() {
            "<none>".to_string()
        } else {
            extension
        })
        .into()),
    }
}

/// Import raw transaction rows, auto-detecting file format and layout
pub fn import_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let path = path.as_ref();
    info!("Importing transactions from: {:?}", path);

    let rows = read_sheet(path)?;
    let raw_rows = parse_rows(&rows)
        .with_context(|| format!("Failed to parse transactions from {}", path.display()))?;

    if raw_rows.is_empty() {
        return Err(InputError::NoTransactions(path.to_path_buf()).into());
    }

    info!("Found {} transaction rows", raw_rows.len());
    Ok(raw_rows)
}

/// Turn sheet rows into raw transaction rows using the detected layout
pub fn parse_rows(rows: &[SheetRow]) -> Result<Vec<RawRow>> {
    match detect_layout(rows) {
        Layout::KuveraGrouped => Ok(kuvera::parse_grouped_rows(rows)),
        Layout::FlatTable { header_row } => flat_table::parse_flat_rows(rows, header_row),
        Layout::Unknown => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_input_error() {
        let err = import_file("definitely/not/here.xlsx").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let err = read_sheet(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
    }

    #[test]
    fn test_csv_without_transactions_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "just,some,text\nnothing,to,see\n").unwrap();

        let err = import_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::NoTransactions(_))
        ));
    }
}
