//! Analysis pipeline
//!
//! Loader → validation → classifier → aggregator. Produces everything the
//! report emitter and the console need, without writing anything itself.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{Config, FundCatalog};
use crate::importers::{self, RawRow, ValidationIssue};
use crate::tax::{
    aggregate, classify, ClassifiedTransaction, RegulatoryPeriod, TaxRules, TaxSummary,
};

/// Outcome of one run over an input file
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub rules: TaxRules,
    /// Classified transactions in input order
    pub classified: Vec<ClassifiedTransaction>,
    pub rejected: Vec<ValidationIssue>,
    /// Holdings not redeemed yet; excluded from every report
    pub unredeemed: usize,
    pub summary: TaxSummary,
}

impl Analysis {
    /// Detail rows redeemed within `period`, in input order
    pub fn in_period(
        &self,
        period: RegulatoryPeriod,
    ) -> impl Iterator<Item = &ClassifiedTransaction> {
        self.classified.iter().filter(move |tx| tx.period == period)
    }

    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Validate, classify and aggregate raw rows
pub fn analyze_rows(rows: Vec<RawRow>, rules: &TaxRules, catalog: &FundCatalog) -> Analysis {
    let validation = importers::validate_rows(rows, catalog);

    if validation.has_issues() {
        warn!(
            "{} row(s) rejected and excluded from the totals",
            validation.issues.len()
        );
    }

    let classified: Vec<ClassifiedTransaction> = validation
        .valid
        .into_iter()
        .map(|row| classify(row.transaction, row.category, rules))
        .collect();

    let summary = aggregate(&classified);

    info!(
        "Classified {} transactions ({} before cutoff, {} after)",
        classified.len(),
        summary.period(RegulatoryPeriod::Before).transactions,
        summary.period(RegulatoryPeriod::After).transactions
    );

    Analysis {
        rules: *rules,
        classified,
        rejected: validation.issues,
        unredeemed: validation.unredeemed,
        summary,
    }
}

/// Load an input file and run the whole analysis with the given configuration
pub fn analyze_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<Analysis> {
    let rows = importers::import_file(path)?;
    Ok(analyze_rows(rows, &config.tax_rules(), &config.fund_catalog()))
}
