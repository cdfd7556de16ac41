//! Error types for the analyzer
//!
//! Input errors abort the run before any report is written. Row errors never
//! abort: the offending row is set aside in the rejected list and the run
//! continues with the remaining rows.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the input file as a whole
#[derive(Error, Debug)]
pub enum InputError {
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported file format: {0} (supported: .xlsx, .xls, .csv, .txt)")]
    UnsupportedFormat(String),

    #[error("could not read workbook: {0}")]
    Unreadable(String),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no transaction rows found in {}", .0.display())]
    NoTransactions(PathBuf),
}

/// Why a single transaction row was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("{field} is missing")]
    Missing { field: &'static str },

    #[error("{field} '{value}' is not a recognised date")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} '{value}' is not a valid amount")]
    InvalidAmount { field: &'static str, value: String },

    #[error("{field} '{value}' is negative")]
    NegativeAmount { field: &'static str, value: String },

    #[error("transaction number '{0}' is not a whole number")]
    InvalidTransactionNumber(String),

    #[error("no fund category known for '{0}'")]
    UnknownCategory(String),

    #[error("redemption date {redeemed} is before purchase date {purchased}")]
    RedeemedBeforePurchase { purchased: String, redeemed: String },
}

impl RowError {
    /// Name of the field the error refers to, for grouping in summaries
    pub fn field(&self) -> &'static str {
        match self {
            RowError::Missing { field }
            | RowError::InvalidDate { field, .. }
            | RowError::InvalidAmount { field, .. }
            | RowError::NegativeAmount { field, .. } => field,
            RowError::InvalidTransactionNumber(_) => "transaction_number",
            RowError::UnknownCategory(_) => "category",
            RowError::RedeemedBeforePurchase { .. } => "redemption_date",
        }
    }
}

/// Result type alias used across the crate
pub type Result<T> = anyhow::Result<T>;
