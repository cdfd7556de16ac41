//! CSV tables for the tax reports
//!
//! Each table is a header plus one record per row. The header is written
//! even when there are no rows, so an empty period still yields a valid file.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use rust_decimal::Decimal;
use std::path::Path;

use crate::importers::ValidationIssue;
use crate::tax::{ClassifiedTransaction, FundSummary, GainTotals, GainType};

/// A record that can be written as one CSV line
pub trait CsvRow {
    const HEADERS: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn optional_amount(value: Option<Decimal>) -> String {
    value.map(|v| v.normalize().to_string()).unwrap_or_default()
}

/// One line of the overall summary: a period, or the grand total
pub struct SummaryLine<'a> {
    pub label: String,
    pub totals: &'a GainTotals,
}

impl CsvRow for SummaryLine<'_> {
    const HEADERS: &'static [&'static str] = &[
        "Period",
        "Transactions Count",
        "Total Purchase Value",
        "Total Redemption Value",
        "Total STCG",
        "Total LTCG",
        "Total Gains",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.label.clone(),
            self.totals.transactions.to_string(),
            amount(self.totals.total_invested),
            amount(self.totals.total_redeemed),
            amount(self.totals.total_stcg),
            amount(self.totals.total_ltcg),
            amount(self.totals.total_gains()),
        ]
    }
}

impl CsvRow for &ClassifiedTransaction {
    const HEADERS: &'static [&'static str] = &[
        "Fund Name",
        "ISIN",
        "Folio Number",
        "Category",
        "Transaction Number",
        "Units",
        "Purchase Date",
        "Purchase Value",
        "Purchase NAV",
        "Redemption Date",
        "Redemption Value",
        "Redemption NAV",
        "Holding Days",
        "Gain Type",
        "Gain",
        "STCG",
        "LTCG",
        "Treatment",
        "Reported STCG",
        "Reported LTCG",
        "Source Row",
    ];

    fn fields(&self) -> Vec<String> {
        let tx = &self.transaction;
        let details = &tx.details;
        let (stcg, ltcg) = match self.gain_type {
            GainType::Stcg => (self.gain, Decimal::ZERO),
            GainType::Ltcg => (Decimal::ZERO, self.gain),
        };

        vec![
            tx.fund_name.clone(),
            details.isin.clone().unwrap_or_default(),
            details.folio_number.clone().unwrap_or_default(),
            self.category.to_string(),
            tx.transaction_number.to_string(),
            optional_amount(details.units),
            tx.purchase_date.format("%Y-%m-%d").to_string(),
            amount(tx.purchase_value),
            optional_amount(details.purchase_nav),
            tx.redemption_date.format("%Y-%m-%d").to_string(),
            amount(tx.redemption_value),
            optional_amount(details.redemption_nav),
            self.holding_days.to_string(),
            self.gain_type.to_string(),
            amount(self.gain),
            amount(stcg),
            amount(ltcg),
            self.treatment().to_string(),
            details.reported_stcg.map(amount).unwrap_or_default(),
            details.reported_ltcg.map(amount).unwrap_or_default(),
            details.source_row.to_string(),
        ]
    }
}

impl CsvRow for &FundSummary {
    const HEADERS: &'static [&'static str] = &[
        "Fund Name",
        "Number of Transactions",
        "Total Purchase Value",
        "Total Redemption Value",
        "Total STCG",
        "Total LTCG",
        "Total Gains",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.fund_name.clone(),
            self.totals.transactions.to_string(),
            amount(self.totals.total_invested),
            amount(self.totals.total_redeemed),
            amount(self.totals.total_stcg),
            amount(self.totals.total_ltcg),
            amount(self.totals.total_gains()),
        ]
    }
}

impl CsvRow for &ValidationIssue {
    const HEADERS: &'static [&'static str] = &[
        "Row",
        "Fund Name",
        "Transaction Number",
        "Field",
        "Reason",
        "Suggestion",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.row.to_string(),
            self.fund_name.clone(),
            self.transaction_number.clone(),
            self.field().to_string(),
            self.error.to_string(),
            self.suggestion.clone().unwrap_or_default(),
        ]
    }
}

/// Write a table to `path`, replacing any existing file
pub fn write_csv<R, I>(path: &Path, rows: I) -> Result<()>
where
    R: CsvRow,
    I: IntoIterator<Item = R>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_rows(&mut writer, rows)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn write_rows<W, R, I>(writer: &mut csv::Writer<W>, rows: I) -> Result<()>
where
    W: std::io::Write,
    R: CsvRow,
    I: IntoIterator<Item = R>,
{
    writer.write_record(R::HEADERS)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }
    Ok(())
}
