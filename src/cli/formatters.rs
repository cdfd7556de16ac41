//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use mftax::analyzer::Analysis;
use mftax::importers::{validation::issue_summary, ValidationIssue};
use mftax::reports::WriteSummary;
use mftax::tax::{GainTotals, RegulatoryPeriod, TaxRules};
use mftax::utils::{format_amount, format_currency};

const TOP_FUNDS: usize = 5;

fn colored_gain(value: Decimal) -> String {
    let text = format_currency(value);
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// Format the whole analysis (and written report files, if any) as JSON
pub fn format_analysis_json(analysis: &Analysis, reports: Option<&WriteSummary>) -> String {
    #[derive(Serialize)]
    struct JsonReports {
        written: Vec<String>,
        failed: Vec<JsonFailure>,
    }

    #[derive(Serialize)]
    struct JsonFailure {
        path: String,
        error: String,
    }

    #[derive(Serialize)]
    struct JsonOutput<'a> {
        #[serde(flatten)]
        analysis: &'a Analysis,
        reports: Option<JsonReports>,
    }

    let reports = reports.map(|summary| JsonReports {
        written: summary
            .written
            .iter()
            .map(|(_, path)| path.display().to_string())
            .collect(),
        failed: summary
            .failed
            .iter()
            .map(|f| JsonFailure {
                path: f.path.display().to_string(),
                error: format!("{:#}", f.error),
            })
            .collect(),
    });

    serde_json::to_string_pretty(&JsonOutput { analysis, reports })
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Overall summary table: one row per period plus the grand total
pub fn format_summary_table(analysis: &Analysis) -> String {
    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "Period")]
        period: String,
        #[tabled(rename = "Txns")]
        transactions: usize,
        #[tabled(rename = "Invested")]
        invested: String,
        #[tabled(rename = "Redeemed")]
        redeemed: String,
        #[tabled(rename = "STCG")]
        stcg: String,
        #[tabled(rename = "LTCG")]
        ltcg: String,
        #[tabled(rename = "Total Gains")]
        total: String,
    }

    let row = |period: String, totals: &GainTotals| SummaryRow {
        period,
        transactions: totals.transactions,
        invested: format_amount(totals.total_invested),
        redeemed: format_amount(totals.total_redeemed),
        stcg: format_amount(totals.total_stcg),
        ltcg: format_amount(totals.total_ltcg),
        total: colored_gain(totals.total_gains()),
    };

    let cutoff = analysis.rules.cutoff_date;
    let mut rows: Vec<SummaryRow> = analysis
        .summary
        .periods
        .iter()
        .map(|p| row(p.period.label(cutoff), &p.totals))
        .collect();
    rows.push(row("Total".bold().to_string(), &analysis.summary.overall()));

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    format!(
        "\n{} Overall Summary\n\n{}\n",
        "📊".cyan().bold(),
        table
    )
}

/// Totals and top funds by gains for one period
pub fn format_period_section(analysis: &Analysis, period: RegulatoryPeriod) -> String {
    let totals = analysis.summary.period(period);
    let mut output = format!(
        "\n{}\n",
        period
            .label(analysis.rules.cutoff_date)
            .to_uppercase()
            .bold()
    );

    if totals.transactions == 0 {
        output.push_str(&format!("  {}\n", "No redemptions in this period".bright_black()));
        return output;
    }

    output.push_str(&format!("  {:<24} {}\n", "Transactions:", totals.transactions));
    output.push_str(&format!(
        "  {:<24} {}\n",
        "Total Purchase Value:",
        format_currency(totals.total_invested)
    ));
    output.push_str(&format!(
        "  {:<24} {}\n",
        "Total Redemption Value:",
        format_currency(totals.total_redeemed)
    ));
    output.push_str(&format!("  {:<24} {}\n", "Total STCG:", colored_gain(totals.total_stcg)));
    output.push_str(&format!("  {:<24} {}\n", "Total LTCG:", colored_gain(totals.total_ltcg)));

    #[derive(Tabled)]
    struct TopFundRow {
        #[tabled(rename = "Fund Name")]
        fund_name: String,
        #[tabled(rename = "Total Gains")]
        total_gains: String,
    }

    let top: Vec<TopFundRow> = analysis
        .summary
        .funds_in(period)
        .sorted_by(|a, b| b.totals.total_gains().cmp(&a.totals.total_gains()))
        .take(TOP_FUNDS)
        .map(|f| TopFundRow {
            fund_name: f.fund_name.clone(),
            total_gains: colored_gain(f.totals.total_gains()),
        })
        .collect();

    let mut table = Table::new(&top);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());

    output.push_str(&format!("\n  Top {} funds by gains:\n{}\n", TOP_FUNDS, table));
    output
}

/// Input accounting: classified, unredeemed and rejected rows
pub fn format_input_summary(analysis: &Analysis) -> String {
    let mut output = format!(
        "\n{} Classified {} redeemed transactions\n",
        "✓".green().bold(),
        analysis.classified.len()
    );
    if analysis.unredeemed > 0 {
        output.push_str(&format!(
            "  {} holding(s) not redeemed yet, skipped\n",
            analysis.unredeemed
        ));
    }
    output
}

/// Warning line for rejected rows, if any
pub fn format_rejected_warning(analysis: &Analysis, listed: bool) -> Option<String> {
    if !analysis.has_rejections() {
        return None;
    }
    let hint = if listed {
        String::new()
    } else {
        " (use --show-rejected to list them)".to_string()
    };
    let by_field = issue_summary(&analysis.rejected)
        .into_iter()
        .map(|(field, count)| format!("{}: {}", field, count))
        .join(", ");
    Some(format!(
        "{} {} row(s) rejected and excluded from all totals [{}]{}",
        "⚠".yellow().bold(),
        analysis.rejected.len(),
        by_field,
        hint
    ))
}

/// Table of rejected rows with the reason for each
pub fn format_rejected_table(issues: &[ValidationIssue]) -> String {
    #[derive(Tabled)]
    struct RejectedRow {
        #[tabled(rename = "Row")]
        row: usize,
        #[tabled(rename = "Fund")]
        fund: String,
        #[tabled(rename = "Txn")]
        transaction: String,
        #[tabled(rename = "Reason")]
        reason: String,
    }

    let rows: Vec<RejectedRow> = issues
        .iter()
        .map(|issue| RejectedRow {
            row: issue.row,
            fund: issue.fund_name.clone(),
            transaction: issue.transaction_number.clone(),
            reason: match &issue.suggestion {
                Some(hint) => format!("{}\n{}", issue.error, hint.bright_black()),
                None => issue.error.to_string(),
            },
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    format!("\n{} Rejected rows\n\n{}\n", "✗".red().bold(), table)
}

/// Paths of written reports, plus any that failed
pub fn format_report_files(summary: &WriteSummary, rules: &TaxRules) -> String {
    let mut output = format!("\n{} Reports\n", "📁".cyan().bold());
    for (kind, path) in &summary.written {
        output.push_str(&format!(
            "  {} {:<42} {}\n",
            "✓".green(),
            kind.description(rules),
            path.display()
        ));
    }
    for failure in &summary.failed {
        output.push_str(&format!(
            "  {} {:<42} {} ({})\n",
            "✗".red(),
            failure.kind.description(rules),
            failure.path.display(),
            failure.error
        ));
    }
    output
}

/// Reminders printed after every analysis
pub fn format_itr_notes(rules: &TaxRules) -> String {
    let cutoff = rules.cutoff_date.format("%B %-d, %Y");
    let rule = "━".repeat(80).bright_black();
    format!(
        "\n{rule}\n{}\n{rule}\n\
         1. Redemptions before {cutoff} follow the old tax rules\n\
         2. Redemptions on or after {cutoff} follow the new tax rules\n\
         3. STCG = Short Term Capital Gains, LTCG = Long Term Capital Gains\n\
         4. Equity is long term from {} days, debt from {} days of holding\n\
         5. Please verify all calculations with your tax advisor\n\
         6. Keep all transaction documents for ITR filing\n\
         {rule}\n",
        "IMPORTANT NOTES FOR ITR FILING".bold(),
        rules.old_regime.equity_ltcg_days,
        rules.old_regime.debt_ltcg_days,
    )
}
