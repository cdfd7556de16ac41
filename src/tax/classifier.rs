use rust_decimal::Decimal;
use serde::Serialize;

use super::regime::{FundCategory, GainType, RegulatoryPeriod, TaxRules};
use crate::models::Transaction;

/// A transaction with its holding period, gain and tax classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedTransaction {
    pub transaction: Transaction,
    pub category: FundCategory,
    pub holding_days: i64,
    pub gain: Decimal,
    pub gain_type: GainType,
    pub period: RegulatoryPeriod,
}

impl ClassifiedTransaction {
    /// Short label describing how the gain is treated when filing
    pub fn treatment(&self) -> &'static str {
        match (self.period, self.category, self.gain_type) {
            (RegulatoryPeriod::After, _, _) => "Slab rate (new regime)",
            (RegulatoryPeriod::Before, FundCategory::Debt, GainType::Ltcg) => {
                "Old regime, indexation eligible"
            }
            (RegulatoryPeriod::Before, _, _) => "Old regime",
        }
    }
}

/// Classify a single transaction under the given rules.
///
/// The regulatory period depends only on the redemption date. The long-term
/// threshold is inclusive: a holding of exactly the threshold is LTCG.
pub fn classify(
    transaction: Transaction,
    category: FundCategory,
    rules: &TaxRules,
) -> ClassifiedTransaction {
    let holding_days = transaction.holding_days();
    let period = rules.period_for(transaction.redemption_date);
    let threshold = rules.ltcg_threshold_days(category, period);

    let gain_type = if holding_days >= threshold {
        GainType::Ltcg
    } else {
        GainType::Stcg
    };

    let gain = transaction.gain();

    ClassifiedTransaction {
        transaction,
        category,
        holding_days,
        gain,
        gain_type,
        period,
    }
}
