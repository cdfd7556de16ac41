// Tax module - holding period classification and period/fund rollups

pub mod aggregator;
pub mod classifier;
pub mod regime;

pub use aggregator::{aggregate, FundSummary, GainTotals, PeriodSummary, TaxSummary};
pub use classifier::{classify, ClassifiedTransaction};
pub use regime::{FundCategory, GainType, HoldingThresholds, RegulatoryPeriod, TaxRules};
