use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use super::classifier::ClassifiedTransaction;
use super::regime::{GainType, RegulatoryPeriod};

/// Running totals shared by period and fund-wise summaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GainTotals {
    pub transactions: usize,
    pub total_invested: Decimal,
    pub total_redeemed: Decimal,
    pub total_stcg: Decimal,
    pub total_ltcg: Decimal,
}

impl GainTotals {
    /// Fold one classified transaction into the totals
    pub fn add(&mut self, tx: &ClassifiedTransaction) {
        self.transactions += 1;
        self.total_invested += tx.transaction.purchase_value;
        self.total_redeemed += tx.transaction.redemption_value;
        match tx.gain_type {
            GainType::Stcg => self.total_stcg += tx.gain,
            GainType::Ltcg => self.total_ltcg += tx.gain,
        }
    }

    /// Combine two sets of totals
    pub fn merge(&self, other: &GainTotals) -> GainTotals {
        GainTotals {
            transactions: self.transactions + other.transactions,
            total_invested: self.total_invested + other.total_invested,
            total_redeemed: self.total_redeemed + other.total_redeemed,
            total_stcg: self.total_stcg + other.total_stcg,
            total_ltcg: self.total_ltcg + other.total_ltcg,
        }
    }

    pub fn total_gains(&self) -> Decimal {
        self.total_stcg + self.total_ltcg
    }
}

/// Totals for every transaction redeemed within one regulatory period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: RegulatoryPeriod,
    #[serde(flatten)]
    pub totals: GainTotals,
}

/// Totals for one fund within one regulatory period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundSummary {
    pub fund_name: String,
    pub period: RegulatoryPeriod,
    #[serde(flatten)]
    pub totals: GainTotals,
}

/// Both aggregation granularities for a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxSummary {
    /// Always one entry per regulatory period, in first-seen order
    pub periods: Vec<PeriodSummary>,
    /// One entry per (fund, period), in first-seen order
    pub funds: Vec<FundSummary>,
}

impl TaxSummary {
    pub fn period(&self, period: RegulatoryPeriod) -> GainTotals {
        self.periods
            .iter()
            .find(|p| p.period == period)
            .map(|p| p.totals)
            .unwrap_or_default()
    }

    pub fn funds_in(&self, period: RegulatoryPeriod) -> impl Iterator<Item = &FundSummary> {
        self.funds.iter().filter(move |f| f.period == period)
    }

    /// Grand total across both periods
    pub fn overall(&self) -> GainTotals {
        self.periods
            .iter()
            .fold(GainTotals::default(), |acc, p| acc.merge(&p.totals))
    }
}

/// Group classified transactions by period and by (fund, period).
///
/// A single pass over the input; summaries keep the order in which their key
/// first appears. Periods with no transactions still get a zeroed summary.
pub fn aggregate(transactions: &[ClassifiedTransaction]) -> TaxSummary {
    let mut periods: Vec<PeriodSummary> = Vec::with_capacity(RegulatoryPeriod::ALL.len());
    let mut funds: Vec<FundSummary> = Vec::new();
    let mut fund_index: HashMap<(String, RegulatoryPeriod), usize> = HashMap::new();

    for tx in transactions {
        let period_idx = match periods.iter().position(|p| p.period == tx.period) {
            Some(idx) => idx,
            None => {
                periods.push(PeriodSummary {
                    period: tx.period,
                    totals: GainTotals::default(),
                });
                periods.len() - 1
            }
        };
        periods[period_idx].totals.add(tx);

        let key = (tx.transaction.fund_name.clone(), tx.period);
        let fund_idx = *fund_index.entry(key).or_insert_with(|| {
            funds.push(FundSummary {
                fund_name: tx.transaction.fund_name.clone(),
                period: tx.period,
                totals: GainTotals::default(),
            });
            funds.len() - 1
        });
        funds[fund_idx].totals.add(tx);
    }

    for period in RegulatoryPeriod::ALL {
        if !periods.iter().any(|p| p.period == period) {
            periods.push(PeriodSummary {
                period,
                totals: GainTotals::default(),
            });
        }
    }

    TaxSummary { periods, funds }
}
