use anyhow::Result;
use calamine::{open_workbook_auto, Reader};
use colored::Colorize;
use std::path::Path;

use mftax::error::InputError;
use mftax::importers::excel_sheet::range_to_rows;
use mftax::importers::{self, detect_layout, Layout, SheetRow};

fn print_rows<'a>(rows: impl Iterator<Item = &'a SheetRow>, limit: usize) {
    for (row_idx, row) in rows.take(limit).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(col_idx, cell)| format!("[{}] {}", col_idx, cell))
            .collect();
        if !cells.is_empty() {
            println!("  Row {}: {}", row_idx + 1, cells.join(" | "));
        }
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "xlsx" | "xls" | "xlsm" | "ods"))
        .unwrap_or(false)
}

pub fn dispatch_inspect(file_path: &Path, rows: usize) -> Result<()> {
    if !file_path.exists() {
        return Err(InputError::FileNotFound(file_path.to_path_buf()).into());
    }

    println!(
        "{} Inspecting file: {}\n",
        "📊".cyan().bold(),
        file_path.display().to_string().green()
    );

    // Rows of the sheet the analyzer reads: the first worksheet, or the CSV
    let mut first_sheet: Option<Vec<SheetRow>> = None;

    if is_workbook(file_path) {
        let mut workbook =
            open_workbook_auto(file_path).map_err(|e| InputError::Unreadable(e.to_string()))?;

        let sheet_names = workbook.sheet_names().to_vec();
        println!(
            "{} Found {} sheet(s):",
            "📄".cyan().bold(),
            sheet_names.len()
        );
        for name in &sheet_names {
            println!("  • {}", name.yellow());
        }
        println!();

        for (sheet_idx, sheet_name) in sheet_names.into_iter().enumerate() {
            let range = match workbook.worksheet_range(&sheet_name) {
                Ok(range) => range,
                Err(err) => {
                    eprintln!(
                        "{} Failed to read sheet {}: {}",
                        "⚠".yellow(),
                        sheet_name.yellow(),
                        err
                    );
                    continue;
                }
            };

            println!(
                "{} Sheet: {}",
                "📌".cyan().bold(),
                sheet_name.yellow().bold()
            );
            println!("  Rows: {}", range.height());
            println!("  Columns: {}\n", range.width());

            let sheet_rows = range_to_rows(&range);
            print_rows(sheet_rows.iter(), rows);
            println!();

            if sheet_idx == 0 {
                first_sheet = Some(sheet_rows);
            }
        }
    }

    let sheet = match first_sheet {
        Some(sheet) => sheet,
        None if is_workbook(file_path) => {
            return Err(InputError::Unreadable("first sheet could not be read".to_string()).into())
        }
        None => {
            let sheet = importers::read_sheet(file_path)?;
            println!("  Rows: {}\n", sheet.len());
            print_rows(sheet.iter(), rows);
            println!();
            sheet
        }
    };

    let layout = match detect_layout(&sheet) {
        Layout::KuveraGrouped => "Kuvera capital gains report".to_string(),
        Layout::FlatTable { header_row } => format!("Flat table (header on row {})", header_row + 1),
        Layout::Unknown => "Unknown (no transaction rows would be found)".to_string(),
    };
    println!("{} Detected layout: {}", "🔎".cyan().bold(), layout.bold());

    Ok(())
}
