// Reports module - CSV report files for ITR filing

pub mod csv_export;

use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::analyzer::Analysis;
use crate::tax::{RegulatoryPeriod, TaxRules};
use csv_export::{write_csv, SummaryLine};

/// Format of the run timestamp appended to report file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn run_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One report file produced by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Summary,
    Detail(RegulatoryPeriod),
    FundWise(RegulatoryPeriod),
    Rejected,
}

impl ReportKind {
    /// File name, e.g. `MF_Before_July23_2024_20250101_120000.csv`
    pub fn file_name(&self, rules: &TaxRules, timestamp: Option<&str>) -> String {
        let stem = match self {
            ReportKind::Summary => "MF_Tax_Summary".to_string(),
            ReportKind::Detail(period) => format!("MF_{}_{}", period, rules.cutoff_file_tag()),
            ReportKind::FundWise(period) => {
                format!("MF_FundWise_{}_{}", period, rules.cutoff_file_tag())
            }
            ReportKind::Rejected => "MF_Rejected_Rows".to_string(),
        };

        match timestamp {
            Some(ts) => format!("{}_{}.csv", stem, ts),
            None => format!("{}.csv", stem),
        }
    }

    pub fn description(&self, rules: &TaxRules) -> String {
        let cutoff = rules.cutoff_date.format("%B %-d, %Y");
        match self {
            ReportKind::Summary => "Summary report".to_string(),
            ReportKind::Detail(period) => {
                format!("{} {} transactions", period, cutoff)
            }
            ReportKind::FundWise(period) => format!("Fund-wise report ({} {})", period, cutoff),
            ReportKind::Rejected => "Rejected rows".to_string(),
        }
    }
}

/// Reports a run writes: the five tax reports always, the rejected rows only when there are some
pub fn planned_reports(analysis: &Analysis) -> Vec<ReportKind> {
    let mut kinds = vec![ReportKind::Summary];
    kinds.extend(RegulatoryPeriod::ALL.map(ReportKind::Detail));
    kinds.extend(RegulatoryPeriod::ALL.map(ReportKind::FundWise));
    if analysis.has_rejections() {
        kinds.push(ReportKind::Rejected);
    }
    kinds
}

/// A report that could not be written
#[derive(Debug)]
pub struct FailedReport {
    pub kind: ReportKind,
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// What happened to each planned report
#[derive(Debug, Default)]
pub struct WriteSummary {
    pub written: Vec<(ReportKind, PathBuf)>,
    pub failed: Vec<FailedReport>,
}

impl WriteSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Write every planned report into `output_dir`.
///
/// Each file is attempted on its own; a failure is recorded and the
/// remaining files are still written.
pub fn write_reports(analysis: &Analysis, output_dir: &Path, timestamp: Option<&str>) -> WriteSummary {
    if let Err(e) = fs::create_dir_all(output_dir) {
        warn!("Could not create output directory {}: {}", output_dir.display(), e);
    }

    let mut summary = WriteSummary::default();
    for kind in planned_reports(analysis) {
        let path = output_dir.join(kind.file_name(&analysis.rules, timestamp));
        match write_report(kind, analysis, &path) {
            Ok(()) => {
                info!("{} exported to: {}", kind.description(&analysis.rules), path.display());
                summary.written.push((kind, path));
            }
            Err(error) => {
                error!("Failed to write {}: {:#}", path.display(), error);
                summary.failed.push(FailedReport { kind, path, error });
            }
        }
    }
    summary
}

fn write_report(kind: ReportKind, analysis: &Analysis, path: &Path) -> Result<()> {
    match kind {
        ReportKind::Summary => {
            let overall = analysis.summary.overall();
            let cutoff = analysis.rules.cutoff_date;
            let lines = analysis
                .summary
                .periods
                .iter()
                .map(|p| SummaryLine {
                    label: p.period.label(cutoff),
                    totals: &p.totals,
                })
                .chain(std::iter::once(SummaryLine {
                    label: "Total".to_string(),
                    totals: &overall,
                }));
            write_csv(path, lines)
        }
        ReportKind::Detail(period) => write_csv(path, analysis.in_period(period)),
        ReportKind::FundWise(period) => write_csv(path, analysis.summary.funds_in(period)),
        ReportKind::Rejected => write_csv(path, analysis.rejected.iter()),
    }
}
