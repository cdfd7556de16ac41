//! Kuvera capital gains report importer
//!
//! The report groups redemptions by fund and folio:
//!
//! ```text
//! Axis Bluechip Fund - Direct Growth [ISIN: INF846K01DP8] (Equity)
//! Folio No: 91012345678
//! 1 | 120.5 | Aug 09, 2023 | 5,000.00 | 41.49 | ... | Jan 10, 2024 | 5,600.00 | 46.47 | 600.00 | 0
//! 2 | ...
//! ```
//!
//! Transaction rows are recognised by an all-digit first cell and read from
//! fixed column positions.

use tracing::{debug, info};

use super::{RawRow, SheetRow};
use crate::tax::FundCategory;

const ISIN_MARKER: &str = "[ISIN:";
const FOLIO_MARKER: &str = "Folio No:";

/// Fixed column positions of a transaction row
mod col {
    pub const TRANSACTION_NUMBER: usize = 0;
    pub const UNITS: usize = 1;
    pub const PURCHASE_DATE: usize = 2;
    pub const PURCHASE_VALUE: usize = 3;
    pub const PURCHASE_NAV: usize = 4;
    pub const REDEMPTION_DATE: usize = 8;
    pub const REDEMPTION_VALUE: usize = 9;
    pub const REDEMPTION_NAV: usize = 10;
    pub const STCG: usize = 11;
    pub const LTCG: usize = 12;
}

/// Fund line parsed from `<name> [ISIN: <isin>] (<extra>)`
#[derive(Debug, Clone, PartialEq)]
struct FundHeader {
    name: String,
    isin: Option<String>,
    category: Option<String>,
}

fn row_text(row: &[String]) -> String {
    row.iter()
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// True for a fund header line
pub fn is_fund_header(row: &[String]) -> bool {
    let text = row_text(row);
    text.contains(ISIN_MARKER) && text.contains("] (")
}

fn parse_fund_header(text: &str) -> Option<FundHeader> {
    let (name, rest) = text.split_once(ISIN_MARKER)?;
    let (isin, extra) = rest.split_once(']').unwrap_or((rest, ""));

    let isin = isin.trim();
    let extra = extra
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim();

    Some(FundHeader {
        name: name.trim().to_string(),
        isin: (!isin.is_empty()).then(|| isin.to_string()),
        category: category_hint(extra),
    })
}

/// Pick a fund category out of the header's parenthetical, e.g. "Equity" or "Debt: Liquid"
fn category_hint(extra: &str) -> Option<String> {
    if extra.parse::<FundCategory>().is_ok() {
        return Some(extra.to_string());
    }
    extra
        .split(|c: char| !c.is_alphabetic())
        .find(|word| !word.is_empty())
        .filter(|word| word.parse::<FundCategory>().is_ok())
        .map(|word| word.to_string())
}

fn is_transaction_row(row: &[String]) -> bool {
    row.first()
        .map(|cell| !cell.is_empty() && cell.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).map(|c| c.trim().to_string()).unwrap_or_default()
}

/// Parse every transaction row of a Kuvera grouped report
pub fn parse_grouped_rows(rows: &[SheetRow]) -> Vec<RawRow> {
    let mut current_fund: Option<FundHeader> = None;
    let mut current_folio: Option<String> = None;
    let mut raw_rows = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let text = row_text(row);
        if text.is_empty() {
            continue;
        }

        if is_fund_header(row) {
            current_fund = parse_fund_header(&text);
            current_folio = None;
            debug!("Fund section: {:?}", current_fund);
            continue;
        }

        if let Some((_, folio)) = text.split_once(FOLIO_MARKER) {
            current_folio = Some(folio.trim().to_string());
            continue;
        }

        if !is_transaction_row(row) {
            continue;
        }

        let fund = current_fund.as_ref();
        raw_rows.push(RawRow {
            row_number: idx + 1,
            fund_name: fund.map(|f| f.name.clone()).unwrap_or_default(),
            isin: fund.and_then(|f| f.isin.clone()),
            folio_number: current_folio.clone(),
            category: fund.and_then(|f| f.category.clone()),
            transaction_number: cell(row, col::TRANSACTION_NUMBER),
            units: cell(row, col::UNITS),
            purchase_date: cell(row, col::PURCHASE_DATE),
            purchase_value: cell(row, col::PURCHASE_VALUE),
            purchase_nav: cell(row, col::PURCHASE_NAV),
            redemption_date: cell(row, col::REDEMPTION_DATE),
            redemption_value: cell(row, col::REDEMPTION_VALUE),
            redemption_nav: cell(row, col::REDEMPTION_NAV),
            reported_stcg: cell(row, col::STCG),
            reported_ltcg: cell(row, col::LTCG),
        });
    }

    info!("Parsed {} transaction rows from Kuvera report", raw_rows.len());
    raw_rows
}
