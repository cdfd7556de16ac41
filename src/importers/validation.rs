//! Row validation
//!
//! Turns raw text rows into typed transactions with explicit parsing. Every
//! row either becomes a valid transaction, is counted as an unredeemed
//! holding, or is rejected with a reason. Nothing is coerced silently.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{debug, warn};

use super::RawRow;
use crate::config::FundCatalog;
use crate::error::RowError;
use crate::models::{Transaction, TransactionDetails};
use crate::tax::FundCategory;

/// Accepted date formats, tried in order. Years must be written in full.
const DATE_FORMATS: &[&str] = &[
    "%b %d, %Y", // Aug 09, 2023
    "%B %d, %Y", // August 09, 2023
    "%d/%m/%Y",  // 09/08/2023
    "%Y-%m-%d",  // 2023-08-09
    "%d-%m-%Y",  // 09-08-2023
    "%d-%b-%Y",  // 09-Aug-2023
    "%d %b %Y",  // 09 Aug 2023
];

/// A rejected row and why it was rejected
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// Row number in the source sheet (1-indexed for user display)
    pub row: usize,
    pub fund_name: String,
    pub transaction_number: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: RowError,
    /// Suggestion for fixing the issue (if available)
    pub suggestion: Option<String>,
}

fn serialize_display<S: serde::Serializer>(error: &RowError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

impl ValidationIssue {
    pub fn new(raw: &RawRow, error: RowError) -> Self {
        Self {
            row: raw.row_number,
            fund_name: raw.fund_name.clone(),
            transaction_number: raw.transaction_number.clone(),
            error,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn field(&self) -> &'static str {
        self.error.field()
    }
}

/// A transaction that passed validation, with its resolved category
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRow {
    pub transaction: Transaction,
    pub category: FundCategory,
}

/// Result of validation: valid rows, rejected rows and unredeemed holdings
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub valid: Vec<ValidRow>,
    pub issues: Vec<ValidationIssue>,
    /// Rows with no redemption yet; not part of any capital gains report
    pub unredeemed: usize,
}

impl ValidationResult {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Count issues by field for summary reporting
pub fn issue_summary(issues: &[ValidationIssue]) -> BTreeMap<&'static str, usize> {
    let mut summary = BTreeMap::new();
    for issue in issues {
        *summary.entry(issue.field()).or_insert(0) += 1;
    }
    summary
}

enum RowOutcome {
    Valid(ValidRow),
    Unredeemed,
}

/// Validate raw rows in input order.
///
/// Does NOT stop on the first bad row; every row is checked and all
/// rejections are collected.
pub fn validate_rows<I>(rows: I, catalog: &FundCatalog) -> ValidationResult
where
    I: IntoIterator<Item = RawRow>,
{
    let mut result = ValidationResult::default();

    for raw in rows {
        match validate_row(&raw, catalog) {
            Ok(RowOutcome::Valid(row)) => result.valid.push(row),
            Ok(RowOutcome::Unredeemed) => {
                debug!("Row {} not redeemed yet, skipping", raw.row_number);
                result.unredeemed += 1;
            }
            Err(issue) => {
                warn!("Rejecting row {}: {}", issue.row, issue.error);
                result.issues.push(issue);
            }
        }
    }

    result
}

fn is_blank(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == "-"
}

fn validate_row(raw: &RawRow, catalog: &FundCatalog) -> Result<RowOutcome, ValidationIssue> {
    if is_blank(&raw.redemption_date) {
        return Ok(RowOutcome::Unredeemed);
    }

    let reject = |error: RowError| ValidationIssue::new(raw, error);

    let fund_name = raw.fund_name.trim();
    if fund_name.is_empty() {
        return Err(reject(RowError::Missing { field: "fund_name" }));
    }

    let transaction_number = parse_transaction_number(&raw.transaction_number).map_err(reject)?;

    let purchase_date = parse_date(&raw.purchase_date, "purchase_date")
        .map_err(|e| date_issue(raw, e))?;
    let redemption_date = parse_date(&raw.redemption_date, "redemption_date")
        .map_err(|e| date_issue(raw, e))?;

    if redemption_date < purchase_date {
        return Err(reject(RowError::RedeemedBeforePurchase {
            purchased: purchase_date.to_string(),
            redeemed: redemption_date.to_string(),
        }));
    }

    let purchase_value = parse_amount(&raw.purchase_value, "purchase_value").map_err(reject)?;
    let redemption_value =
        parse_amount(&raw.redemption_value, "redemption_value").map_err(reject)?;

    let details = TransactionDetails {
        source_row: raw.row_number,
        isin: raw.isin.clone(),
        folio_number: raw.folio_number.clone(),
        units: parse_optional_amount(&raw.units, "units", false).map_err(reject)?,
        purchase_nav: parse_optional_amount(&raw.purchase_nav, "purchase_nav", false)
            .map_err(reject)?,
        redemption_nav: parse_optional_amount(&raw.redemption_nav, "redemption_nav", false)
            .map_err(reject)?,
        reported_stcg: parse_optional_amount(&raw.reported_stcg, "reported_stcg", true)
            .map_err(reject)?,
        reported_ltcg: parse_optional_amount(&raw.reported_ltcg, "reported_ltcg", true)
            .map_err(reject)?,
    };

    let from_input = match raw.category.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => match text.parse::<FundCategory>() {
            Ok(category) => Some(category),
            // Only an exact [funds] entry may override a category the input got wrong
            Err(_) if catalog.has_exact(fund_name) => None,
            Err(_) => {
                return Err(reject(RowError::UnknownCategory(text.to_string())).with_suggestion(
                    format!(
                        "Use Equity or Debt, or add \"{}\" under [funds] in the config file",
                        fund_name
                    ),
                ))
            }
        },
        _ => None,
    };
    let category = catalog.resolve(fund_name, from_input).ok_or_else(|| {
        reject(RowError::UnknownCategory(fund_name.to_string())).with_suggestion(format!(
            "Add \"{}\" = \"equity\" or \"debt\" under [funds] in the config file",
            fund_name
        ))
    })?;

    Ok(RowOutcome::Valid(ValidRow {
        transaction: Transaction {
            fund_name: fund_name.to_string(),
            transaction_number,
            purchase_date,
            purchase_value,
            redemption_date,
            redemption_value,
            details,
        },
        category,
    }))
}

fn date_issue(raw: &RawRow, error: RowError) -> ValidationIssue {
    let issue = ValidationIssue::new(raw, error);
    if matches!(issue.error, RowError::InvalidDate { .. }) {
        issue.with_suggestion("Use a date such as Aug 09, 2023, 09/08/2023 or 2023-08-09")
    } else {
        issue
    }
}

fn parse_transaction_number(text: &str) -> Result<u32, RowError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RowError::Missing {
            field: "transaction_number",
        });
    }
    text.parse::<u32>()
        .map_err(|_| RowError::InvalidTransactionNumber(text.to_string()))
}

/// Parse a date in one of the accepted formats
pub fn parse_date(text: &str, field: &'static str) -> Result<NaiveDate, RowError> {
    let cleaned = text.trim().trim_matches('"').trim();
    if is_blank(cleaned) {
        return Err(RowError::Missing { field });
    }

    // chrono's %Y also takes one or two digits; "25/07/24" must not become year 24
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
        .find(|date| date.year() >= 1000)
        .ok_or_else(|| RowError::InvalidDate {
            field,
            value: cleaned.to_string(),
        })
}

fn clean_amount(text: &str) -> String {
    text.replace('₹', "")
        .replace("Rs.", "")
        .replace("INR", "")
        .replace([',', '"'], "")
        .split_whitespace()
        .collect()
}

/// Parse a required, non-negative currency amount
pub fn parse_amount(text: &str, field: &'static str) -> Result<Decimal, RowError> {
    let cleaned = clean_amount(text);
    if is_blank(&cleaned) {
        return Err(RowError::Missing { field });
    }

    let value = Decimal::from_str(&cleaned).map_err(|_| RowError::InvalidAmount {
        field,
        value: text.trim().to_string(),
    })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(RowError::NegativeAmount {
            field,
            value: text.trim().to_string(),
        });
    }

    Ok(value)
}

/// Parse an optional amount; blank is `None`, garbage is still an error
fn parse_optional_amount(
    text: &str,
    field: &'static str,
    allow_negative: bool,
) -> Result<Option<Decimal>, RowError> {
    let cleaned = clean_amount(text);
    if is_blank(&cleaned) {
        return Ok(None);
    }
    if allow_negative {
        return Decimal::from_str(&cleaned)
            .map(Some)
            .map_err(|_| RowError::InvalidAmount {
                field,
                value: text.trim().to_string(),
            });
    }
    parse_amount(text, field).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CategoryRule;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn catalog() -> FundCatalog {
        let mut funds = HashMap::new();
        funds.insert("Axis Bluechip Fund".to_string(), FundCategory::Equity);
        FundCatalog::new(&funds, &[])
    }

    fn sample_raw() -> RawRow {
        RawRow {
            row_number: 7,
            fund_name: "Axis Bluechip Fund".to_string(),
            transaction_number: "3".to_string(),
            units: "120.5".to_string(),
            purchase_date: "Aug 09, 2023".to_string(),
            purchase_value: "₹5,000.00".to_string(),
            redemption_date: "10/01/2024".to_string(),
            redemption_value: "\"5,600.50\"".to_string(),
            reported_stcg: "600.50".to_string(),
            ..RawRow::default()
        }
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 8, 9).unwrap();
        for text in [
            "Aug 09, 2023",
            "August 09, 2023",
            "09/08/2023",
            "2023-08-09",
            "09-08-2023",
            "09-Aug-2023",
            "09 Aug 2023",
            "\"Aug 09, 2023\"",
        ] {
            assert_eq!(parse_date(text, "purchase_date"), Ok(expected), "format: {}", text);
        }
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(
            parse_date("31/02/2024", "redemption_date"),
            Err(RowError::InvalidDate {
                field: "redemption_date",
                value: "31/02/2024".to_string()
            })
        );
        assert_eq!(
            parse_date(" - ", "redemption_date"),
            Err(RowError::Missing {
                field: "redemption_date"
            })
        );
    }

    #[test]
    fn test_parse_date_rejects_short_years() {
        for text in ["25/07/24", "9/8/23", "01-01-24", "Jul 25, 24"] {
            assert_eq!(
                parse_date(text, "redemption_date"),
                Err(RowError::InvalidDate {
                    field: "redemption_date",
                    value: text.to_string()
                }),
                "format: {}",
                text
            );
        }
    }

    #[test]
    fn test_short_year_dates_are_rejected_not_misdated() {
        let mut raw = sample_raw();
        raw.purchase_date = "01/01/20".to_string();
        raw.redemption_date = "25/07/24".to_string();

        let result = validate_rows(vec![raw], &catalog());
        assert!(result.valid.is_empty());
        assert_eq!(result.issues.len(), 1);
        assert!(matches!(
            result.issues[0].error,
            RowError::InvalidDate { field: "purchase_date", .. }
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("₹1,23,456.78", "purchase_value"), Ok(dec!(123456.78)));
        assert_eq!(parse_amount("\"10,000\"", "purchase_value"), Ok(dec!(10000)));
        assert_eq!(parse_amount("0", "purchase_value"), Ok(dec!(0)));
        assert!(matches!(
            parse_amount("-5", "purchase_value"),
            Err(RowError::NegativeAmount { .. })
        ));
        assert!(matches!(
            parse_amount("12abc", "purchase_value"),
            Err(RowError::InvalidAmount { .. })
        ));
        assert!(matches!(
            parse_amount("", "purchase_value"),
            Err(RowError::Missing { .. })
        ));
    }

    #[test]
    fn test_valid_row() {
        let result = validate_rows(vec![sample_raw()], &catalog());
        assert!(!result.has_issues());
        assert_eq!(result.valid.len(), 1);

        let row = &result.valid[0];
        assert_eq!(row.category, FundCategory::Equity);
        assert_eq!(row.transaction.transaction_number, 3);
        assert_eq!(row.transaction.purchase_value, dec!(5000.00));
        assert_eq!(row.transaction.redemption_value, dec!(5600.50));
        assert_eq!(
            row.transaction.redemption_date,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
        assert_eq!(row.transaction.details.source_row, 7);
        assert_eq!(row.transaction.details.units, Some(dec!(120.5)));
        assert_eq!(row.transaction.details.reported_stcg, Some(dec!(600.50)));
        assert_eq!(row.transaction.details.reported_ltcg, None);
    }

    #[test]
    fn test_unredeemed_rows_are_counted_not_rejected() {
        let mut raw = sample_raw();
        raw.redemption_date = "-".to_string();
        raw.purchase_date = "garbage".to_string();

        let result = validate_rows(vec![raw], &catalog());
        assert_eq!(result.unredeemed, 1);
        assert!(result.valid.is_empty());
        assert!(!result.has_issues());
    }

    #[test]
    fn test_unparseable_redemption_date_is_rejected() {
        let mut bad = sample_raw();
        bad.redemption_date = "2024-13-45".to_string();

        let result = validate_rows(vec![bad, sample_raw()], &catalog());
        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.issues.len(), 1);

        let issue = &result.issues[0];
        assert_eq!(issue.row, 7);
        assert_eq!(issue.field(), "redemption_date");
        assert!(issue.suggestion.is_some());
    }

    #[test]
    fn test_unknown_category_is_rejected_with_suggestion() {
        let mut raw = sample_raw();
        raw.fund_name = "Mystery Fund".to_string();

        let result = validate_rows(vec![raw.clone()], &catalog());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(
            result.issues[0].error,
            RowError::UnknownCategory("Mystery Fund".to_string())
        );
        assert!(result.issues[0]
            .suggestion
            .as_deref()
            .unwrap()
            .contains("[funds]"));

        // A category carried by the input is enough
        raw.category = Some("Debt".to_string());
        let result = validate_rows(vec![raw], &catalog());
        assert_eq!(result.valid[0].category, FundCategory::Debt);
    }

    #[test]
    fn test_unrecognised_input_category_is_rejected() {
        let catalog = FundCatalog::new(
            &HashMap::new(),
            &[CategoryRule {
                contains: "fund".to_string(),
                category: FundCategory::Equity,
            }],
        );
        let mut raw = sample_raw();
        raw.fund_name = "Balanced Advantage Fund".to_string();
        raw.category = Some("Hybrid".to_string());

        // The contains rule would match, but the input says something else
        let result = validate_rows(vec![raw.clone()], &catalog);
        assert!(result.valid.is_empty());
        assert_eq!(
            result.issues[0].error,
            RowError::UnknownCategory("Hybrid".to_string())
        );

        // An exact [funds] entry still wins
        let mut listed = sample_raw();
        listed.category = Some("Hybrid".to_string());
        let result = validate_rows(vec![listed], &self::catalog());
        assert_eq!(result.valid[0].category, FundCategory::Equity);
    }

    #[test]
    fn test_redemption_before_purchase_is_rejected() {
        let mut raw = sample_raw();
        raw.redemption_date = "2023-01-01".to_string();

        let result = validate_rows(vec![raw], &catalog());
        assert!(matches!(
            result.issues[0].error,
            RowError::RedeemedBeforePurchase { .. }
        ));
    }

    #[test]
    fn test_negative_and_garbage_values() {
        let mut negative = sample_raw();
        negative.purchase_value = "-100".to_string();
        let mut garbage_units = sample_raw();
        garbage_units.units = "n/a".to_string();
        let mut missing_fund = sample_raw();
        missing_fund.fund_name = String::new();

        let result = validate_rows(vec![negative, garbage_units, missing_fund], &catalog());
        assert!(result.valid.is_empty());

        let summary = issue_summary(&result.issues);
        assert_eq!(summary.get("purchase_value"), Some(&1));
        assert_eq!(summary.get("units"), Some(&1));
        assert_eq!(summary.get("fund_name"), Some(&1));
    }

    #[test]
    fn test_reported_losses_may_be_negative() {
        let mut raw = sample_raw();
        raw.reported_stcg = "-1,200.00".to_string();

        let result = validate_rows(vec![raw], &catalog());
        assert_eq!(
            result.valid[0].transaction.details.reported_stcg,
            Some(dec!(-1200.00))
        );
    }
}
