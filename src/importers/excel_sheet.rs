use anyhow::{anyhow, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, info};

use super::SheetRow;
use crate::error::InputError;

/// Read the first worksheet of an Excel/ODS workbook as text rows
pub fn read_first_sheet<P: AsRef<Path>>(path: P) -> Result<Vec<SheetRow>> {
    let path = path.as_ref();
    info!("Reading workbook: {:?}", path);

    let mut workbook =
        open_workbook_auto(path).map_err(|e| InputError::Unreadable(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    debug!("Found {} sheet(s): {:?}", sheet_names.len(), sheet_names);

    let sheet_name = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| anyhow!(InputError::Unreadable("workbook has no sheets".to_string())))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| InputError::Unreadable(format!("sheet '{}': {}", sheet_name, e)))?;

    info!(
        "Reading sheet '{}' ({} rows x {} columns)",
        sheet_name,
        range.height(),
        range.width()
    );

    Ok(range_to_rows(&range))
}

/// Convert a worksheet range to text rows at their sheet positions.
///
/// calamine starts a range at the first used cell, so leading blank rows and
/// columns are put back; row `i` of the result is sheet row `i + 1`.
pub fn range_to_rows(range: &Range<Data>) -> Vec<SheetRow> {
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let lead_cols = first_col as usize;

    let padding = (0..first_row).map(|_| SheetRow::new());
    let used = range.rows().map(|row| {
        let mut cells = vec![String::new(); lead_cols];
        cells.extend(row.iter().map(cell_to_text));
        cells
    });
    padding.chain(used).collect()
}

/// Render a cell as text without guessing at its meaning.
///
/// Date cells become ISO `YYYY-MM-DD`, numbers their shortest decimal form.
pub fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) => s.split('T').next().unwrap_or(s).trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Convert an Excel serial day number (1900 date system) to a date
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    excel_epoch.checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}
