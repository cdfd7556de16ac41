use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// A fully parsed redemption lot.
///
/// Only built by row validation, so the invariants hold for every instance:
/// `redemption_date >= purchase_date` and both values are non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub fund_name: String,
    pub transaction_number: u32,
    pub purchase_date: NaiveDate,
    pub purchase_value: Decimal,
    pub redemption_date: NaiveDate,
    pub redemption_value: Decimal,
    pub details: TransactionDetails,
}

/// Informational columns echoed into detail reports. Never used for classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionDetails {
    /// Row number in the source sheet (1-indexed)
    pub source_row: usize,
    pub isin: Option<String>,
    pub folio_number: Option<String>,
    pub units: Option<Decimal>,
    pub purchase_nav: Option<Decimal>,
    pub redemption_nav: Option<Decimal>,
    /// STCG as reported by the platform export
    pub reported_stcg: Option<Decimal>,
    /// LTCG as reported by the platform export
    pub reported_ltcg: Option<Decimal>,
}

impl Transaction {
    /// Calendar days between purchase and redemption
    pub fn holding_days(&self) -> i64 {
        (self.redemption_date - self.purchase_date).num_days()
    }

    /// Signed gain; a loss is negative
    pub fn gain(&self) -> Decimal {
        self.redemption_value - self.purchase_value
    }
}
