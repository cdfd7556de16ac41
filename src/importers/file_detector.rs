use tracing::info;

use super::flat_table::looks_like_header;
use super::kuvera::is_fund_header;
use super::SheetRow;

/// Layout of the transaction sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Kuvera capital gains report: fund and folio header lines followed by
    /// numbered transaction rows in fixed columns
    KuveraGrouped,
    /// One transaction per row below a header row
    FlatTable { header_row: usize },
    Unknown,
}

/// Detect the layout of a sheet based on its contents
///
/// Detection strategy:
/// - Any `<Fund> [ISIN: ...]` line → Kuvera grouped report
/// - Otherwise the first row whose cells name both a purchase date and a
///   redemption date column → flat table with that header row
/// - Neither → unknown (no transactions)
pub fn detect_layout(rows: &[SheetRow]) -> Layout {
    if rows.iter().any(|row| is_fund_header(row)) {
        info!("Detected Kuvera grouped layout (found ISIN fund headers)");
        return Layout::KuveraGrouped;
    }

    if let Some(header_row) = rows.iter().position(|row| looks_like_header(row)) {
        info!("Detected flat table layout (header on row {})", header_row + 1);
        return Layout::FlatTable { header_row };
    }

    info!("Could not determine sheet layout");
    Layout::Unknown
}
