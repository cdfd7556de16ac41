use anyhow::{Context, Result};
use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::SheetRow;

/// Read a CSV export as text rows.
///
/// The delimiter is picked from the first non-empty line (`,` or `;`).
/// UTF-8 is expected; anything else is decoded as Windows-1252.
pub fn read_csv_sheet<P: AsRef<Path>>(path: P) -> Result<Vec<SheetRow>> {
    let path = path.as_ref();
    info!("Reading CSV file: {:?}", path);

    let bytes = fs::read(path).context("Failed to open CSV file")?;
    let content = decode(&bytes);
    let delimiter = detect_delimiter(&content);
    debug!("CSV delimiter: {:?}", delimiter as char);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read CSV record")?;
        rows.push(record.iter().map(|field| field.trim().to_string()).collect());
    }

    Ok(rows)
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            debug!("CSV is not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn detect_delimiter(content: &str) -> u8 {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();

    if first_line.matches(';').count() > first_line.matches(',').count() {
        b';'
    } else {
        b','
    }
}
