//! Flat transaction table importer
//!
//! One redemption per row under a header row. Columns are located by
//! scanning header text, so column order and extra columns do not matter.

use anyhow::Result;
use tracing::{debug, info};

use super::{RawRow, SheetRow};
use crate::error::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    FundName,
    TransactionNumber,
    PurchaseDate,
    PurchaseValue,
    RedemptionDate,
    RedemptionValue,
    Category,
    Isin,
    Folio,
    Units,
    PurchaseNav,
    RedemptionNav,
    ReportedStcg,
    ReportedLtcg,
}

fn mentions_purchase(text: &str) -> bool {
    ["purchase", "buy", "invest", "cost"]
        .iter()
        .any(|k| text.contains(k))
}

fn mentions_redemption(text: &str) -> bool {
    ["redemption", "redeem", "sell", "sale", "proceeds"]
        .iter()
        .any(|k| text.contains(k))
}

/// Map one header cell to the field it names, if any
fn classify_header(header: &str) -> Option<Field> {
    let text = header.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if text.contains("category") || text.contains("asset class") {
        return Some(Field::Category);
    }
    if text.contains("isin") {
        return Some(Field::Isin);
    }
    if text.contains("folio") {
        return Some(Field::Folio);
    }
    if text.contains("stcg") || text.contains("short term") {
        return Some(Field::ReportedStcg);
    }
    if text.contains("ltcg") || text.contains("long term") {
        return Some(Field::ReportedLtcg);
    }
    if text.contains("nav") {
        if mentions_redemption(&text) {
            return Some(Field::RedemptionNav);
        }
        if mentions_purchase(&text) {
            return Some(Field::PurchaseNav);
        }
        return None;
    }
    if text.contains("date") {
        if mentions_redemption(&text) {
            return Some(Field::RedemptionDate);
        }
        if mentions_purchase(&text) {
            return Some(Field::PurchaseDate);
        }
        return None;
    }
    if ["value", "amount", "proceeds", "cost"]
        .iter()
        .any(|k| text.contains(k))
    {
        if mentions_redemption(&text) {
            return Some(Field::RedemptionValue);
        }
        if mentions_purchase(&text) {
            return Some(Field::PurchaseValue);
        }
        return None;
    }
    if text.contains("unit") || text.contains("qty") || text.contains("quantity") {
        return Some(Field::Units);
    }
    if text.contains("txn")
        || text.contains("transaction")
        || text == "#"
        || text == "no"
        || text == "no."
        || text.starts_with("sr")
        || text.starts_with("s.no")
    {
        return Some(Field::TransactionNumber);
    }
    if text.contains("fund") || text.contains("scheme") || text == "name" {
        return Some(Field::FundName);
    }
    None
}

/// Column mapping built from the header row
#[derive(Debug, Clone, Default)]
struct ColumnMapping {
    fund_name: Option<usize>,
    transaction_number: Option<usize>,
    purchase_date: Option<usize>,
    purchase_value: Option<usize>,
    redemption_date: Option<usize>,
    redemption_value: Option<usize>,
    category: Option<usize>,
    isin: Option<usize>,
    folio: Option<usize>,
    units: Option<usize>,
    purchase_nav: Option<usize>,
    redemption_nav: Option<usize>,
    reported_stcg: Option<usize>,
    reported_ltcg: Option<usize>,
}

impl ColumnMapping {
    /// Create column mapping by scanning the header row; the first column naming a field wins
    fn from_header(header: &[String]) -> Self {
        let mut mapping = ColumnMapping::default();

        for (idx, cell) in header.iter().enumerate() {
            let Some(field) = classify_header(cell) else {
                continue;
            };
            let slot = match field {
                Field::FundName => &mut mapping.fund_name,
                Field::TransactionNumber => &mut mapping.transaction_number,
                Field::PurchaseDate => &mut mapping.purchase_date,
                Field::PurchaseValue => &mut mapping.purchase_value,
                Field::RedemptionDate => &mut mapping.redemption_date,
                Field::RedemptionValue => &mut mapping.redemption_value,
                Field::Category => &mut mapping.category,
                Field::Isin => &mut mapping.isin,
                Field::Folio => &mut mapping.folio,
                Field::Units => &mut mapping.units,
                Field::PurchaseNav => &mut mapping.purchase_nav,
                Field::RedemptionNav => &mut mapping.redemption_nav,
                Field::ReportedStcg => &mut mapping.reported_stcg,
                Field::ReportedLtcg => &mut mapping.reported_ltcg,
            };
            slot.get_or_insert(idx);
        }

        mapping
    }

    /// Names of required columns that were not found
    fn missing_required(&self) -> Vec<String> {
        [
            ("fund_name", self.fund_name),
            ("transaction_number", self.transaction_number),
            ("purchase_date", self.purchase_date),
            ("purchase_value", self.purchase_value),
            ("redemption_date", self.redemption_date),
            ("redemption_value", self.redemption_value),
        ]
        .iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.to_string())
        .collect()
    }
}

/// True for a row that names both a purchase date and a redemption date column
pub fn looks_like_header(row: &[String]) -> bool {
    let first_is_number = row
        .first()
        .map(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_digit()))
        .unwrap_or(false);
    if first_is_number {
        return false;
    }

    let fields: Vec<Field> = row.iter().filter_map(|c| classify_header(c)).collect();
    fields.contains(&Field::PurchaseDate) && fields.contains(&Field::RedemptionDate)
}

fn text_at(row: &[String], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i))
        .map(|c| c.trim().to_string())
        .unwrap_or_default()
}

fn optional_at(row: &[String], idx: Option<usize>) -> Option<String> {
    let text = text_at(row, idx);
    (!text.is_empty()).then_some(text)
}

/// Parse the rows below `header_row` into raw transaction rows
pub fn parse_flat_rows(rows: &[SheetRow], header_row: usize) -> Result<Vec<RawRow>> {
    let header = rows.get(header_row).cloned().unwrap_or_default();
    let mapping = ColumnMapping::from_header(&header);
    debug!("Column mapping: {:?}", mapping);

    let missing = mapping.missing_required();
    if !missing.is_empty() {
        return Err(InputError::MissingColumns(missing).into());
    }

    let mut raw_rows = Vec::new();
    for (idx, row) in rows.iter().enumerate().skip(header_row + 1) {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let raw = RawRow {
            row_number: idx + 1,
            fund_name: text_at(row, mapping.fund_name),
            isin: optional_at(row, mapping.isin),
            folio_number: optional_at(row, mapping.folio),
            category: optional_at(row, mapping.category),
            transaction_number: text_at(row, mapping.transaction_number),
            units: text_at(row, mapping.units),
            purchase_date: text_at(row, mapping.purchase_date),
            purchase_value: text_at(row, mapping.purchase_value),
            purchase_nav: text_at(row, mapping.purchase_nav),
            redemption_date: text_at(row, mapping.redemption_date),
            redemption_value: text_at(row, mapping.redemption_value),
            redemption_nav: text_at(row, mapping.redemption_nav),
            reported_stcg: text_at(row, mapping.reported_stcg),
            reported_ltcg: text_at(row, mapping.reported_ltcg),
        };

        // Subtotal and note rows carry no transaction number and no dates
        if raw.transaction_number.is_empty()
            && raw.purchase_date.is_empty()
            && raw.redemption_date.is_empty()
        {
            debug!("Skipping non-transaction row {}", idx + 1);
            continue;
        }

        raw_rows.push(raw);
    }

    info!("Parsed {} transaction rows from flat table", raw_rows.len());
    Ok(raw_rows)
}
