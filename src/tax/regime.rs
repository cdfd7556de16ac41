//! Tax regime types: fund categories, gain types, regulatory periods and the
//! holding-period rules that tie them together.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date from which the new capital gains rules apply (Finance Act 2024)
pub fn default_cutoff_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 23).expect("valid calendar date")
}

/// Underlying fund category, selects the long-term holding threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FundCategory {
    Equity,
    Debt,
}

impl FundCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundCategory::Equity => "Equity",
            FundCategory::Debt => "Debt",
        }
    }
}

impl FromStr for FundCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equity" | "eq" | "elss" => Ok(FundCategory::Equity),
            "debt" | "dt" => Ok(FundCategory::Debt),
            other => Err(format!("unknown fund category '{}'", other)),
        }
    }
}

impl TryFrom<String> for FundCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FundCategory> for String {
    fn from(value: FundCategory) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short-term or long-term capital gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GainType {
    #[serde(rename = "STCG")]
    Stcg,
    #[serde(rename = "LTCG")]
    Ltcg,
}

impl GainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GainType::Stcg => "STCG",
            GainType::Ltcg => "LTCG",
        }
    }
}

impl fmt::Display for GainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the cutoff a redemption falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegulatoryPeriod {
    Before,
    After,
}

impl RegulatoryPeriod {
    pub const ALL: [RegulatoryPeriod; 2] = [RegulatoryPeriod::Before, RegulatoryPeriod::After];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegulatoryPeriod::Before => "Before",
            RegulatoryPeriod::After => "After",
        }
    }

    /// Long label used in reports, e.g. "Redeemed Before July 23, 2024 (Old Tax Rules)"
    pub fn label(&self, cutoff: NaiveDate) -> String {
        let rules = match self {
            RegulatoryPeriod::Before => "Old Tax Rules",
            RegulatoryPeriod::After => "New Tax Rules",
        };
        format!(
            "Redeemed {} {} ({})",
            self.as_str(),
            cutoff.format("%B %-d, %Y"),
            rules
        )
    }
}

impl fmt::Display for RegulatoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Long-term holding thresholds, in calendar days, for one regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldingThresholds {
    pub equity_ltcg_days: i64,
    pub debt_ltcg_days: i64,
}

impl HoldingThresholds {
    pub fn for_category(&self, category: FundCategory) -> i64 {
        match category {
            FundCategory::Equity => self.equity_ltcg_days,
            FundCategory::Debt => self.debt_ltcg_days,
        }
    }
}

impl Default for HoldingThresholds {
    fn default() -> Self {
        Self {
            equity_ltcg_days: 365,
            debt_ltcg_days: 1095,
        }
    }
}

/// Everything the classifier needs to know about the tax rules.
///
/// The new regime taxes both gain types at slab rate, so its thresholds only
/// drive the STCG/LTCG label; they default to the old-regime values so the
/// labels stay comparable across the two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxRules {
    pub cutoff_date: NaiveDate,
    pub old_regime: HoldingThresholds,
    pub new_regime: HoldingThresholds,
}

impl TaxRules {
    /// Before iff the redemption is strictly earlier than the cutoff
    pub fn period_for(&self, redemption_date: NaiveDate) -> RegulatoryPeriod {
        if redemption_date < self.cutoff_date {
            RegulatoryPeriod::Before
        } else {
            RegulatoryPeriod::After
        }
    }

    pub fn thresholds(&self, period: RegulatoryPeriod) -> &HoldingThresholds {
        match period {
            RegulatoryPeriod::Before => &self.old_regime,
            RegulatoryPeriod::After => &self.new_regime,
        }
    }

    pub fn ltcg_threshold_days(&self, category: FundCategory, period: RegulatoryPeriod) -> i64 {
        self.thresholds(period).for_category(category)
    }

    /// Suffix used in report file names, e.g. "July23_2024"
    pub fn cutoff_file_tag(&self) -> String {
        self.cutoff_date.format("%B%d_%Y").to_string()
    }
}

impl Default for TaxRules {
    fn default() -> Self {
        Self {
            cutoff_date: default_cutoff_date(),
            old_regime: HoldingThresholds::default(),
            new_regime: HoldingThresholds::default(),
        }
    }
}
