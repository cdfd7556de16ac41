//! Library-level tests of the whole pipeline against generated input files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::TempDir;

use mftax::analyzer::{analyze_file, analyze_rows, Analysis};
use mftax::config::{Config, FundCatalog};
use mftax::error::InputError;
use mftax::importers::{self, RawRow};
use mftax::tax::{FundCategory, GainTotals, GainType, RegulatoryPeriod, TaxRules};

use cli_helpers::{write_kuvera_workbook, FLAT_CONFIG, FLAT_CSV};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn kuvera_analysis() -> Analysis {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kuvera.xlsx");
    write_kuvera_workbook(&path);
    analyze_file(&path, &Config::default()).unwrap()
}

/// Sum of gains of the detail rows in one period
fn detail_gains(analysis: &Analysis, period: RegulatoryPeriod) -> Decimal {
    analysis.in_period(period).map(|tx| tx.gain).sum()
}

#[test]
fn test_kuvera_report_end_to_end() {
    let analysis = kuvera_analysis();

    assert_eq!(analysis.classified.len(), 3);
    assert_eq!(analysis.unredeemed, 1);
    assert_eq!(analysis.rejected.len(), 1);
    assert_eq!(analysis.rejected[0].row, 10);
    assert_eq!(analysis.rejected[0].field(), "redemption_date");

    let first = &analysis.classified[0];
    assert_eq!(first.transaction.fund_name, "Axis Bluechip Fund - Direct Growth");
    assert_eq!(first.transaction.details.isin.as_deref(), Some("INF846K01DP8"));
    assert_eq!(first.transaction.details.folio_number.as_deref(), Some("91012345678"));
    assert_eq!(first.transaction.details.units, Some(dec!(120.5)));
    assert_eq!(first.category, FundCategory::Equity);
    assert_eq!(first.holding_days, 366);
    assert_eq!(first.gain_type, GainType::Ltcg);
    assert_eq!(first.period, RegulatoryPeriod::Before);

    let debt = &analysis.classified[2];
    assert_eq!(debt.category, FundCategory::Debt);
    assert_eq!(debt.holding_days, 934);
    assert_eq!(debt.period, RegulatoryPeriod::After);
    assert_eq!(debt.gain_type, GainType::Stcg);
    assert_eq!(debt.gain, dec!(5000));
}

#[test]
fn test_period_totals_match_detail_rows() {
    let analysis = kuvera_analysis();

    for period in RegulatoryPeriod::ALL {
        let totals = analysis.summary.period(period);
        assert_eq!(totals.total_gains(), detail_gains(&analysis, period));
        assert_eq!(
            totals.total_gains(),
            totals.total_redeemed - totals.total_invested
        );
    }

    let before = analysis.summary.period(RegulatoryPeriod::Before);
    assert_eq!(before.transactions, 2);
    assert_eq!(before.total_stcg, dec!(-2000));
    assert_eq!(before.total_ltcg, dec!(2000));
}

#[test]
fn test_fund_wise_totals_reconcile_with_periods() {
    let analysis = kuvera_analysis();

    for period in RegulatoryPeriod::ALL {
        let summed = analysis
            .summary
            .funds_in(period)
            .fold(GainTotals::default(), |acc, f| acc.merge(&f.totals));
        assert_eq!(summed, analysis.summary.period(period));
    }

    let overall = analysis.summary.overall();
    assert_eq!(overall.transactions, analysis.classified.len());
}

#[test]
fn test_flat_csv_with_configured_categories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trades.csv");
    std::fs::write(&path, FLAT_CSV).unwrap();

    let config = Config::from_toml_str(FLAT_CONFIG).unwrap();
    let analysis = analyze_file(&path, &config).unwrap();

    assert_eq!(analysis.classified.len(), 2);
    assert_eq!(analysis.rejected.len(), 1);
    assert_eq!(analysis.rejected[0].fund_name, "Mystery Fund");

    let parag = &analysis.classified[0];
    assert_eq!(parag.transaction.purchase_date, date(2023, 8, 9));
    assert_eq!(parag.transaction.purchase_value, dec!(10000.00));
    assert_eq!(parag.period, RegulatoryPeriod::After);
    assert_eq!(parag.gain_type, GainType::Ltcg);

    let liquid = &analysis.classified[1];
    assert_eq!(liquid.category, FundCategory::Debt);
    assert_eq!(liquid.period, RegulatoryPeriod::Before);
    assert_eq!(liquid.gain_type, GainType::Ltcg);
    assert_eq!(liquid.treatment(), "Old regime, indexation eligible");

    // After is seen first in the input, so it is listed first
    assert_eq!(analysis.summary.periods[0].period, RegulatoryPeriod::After);
}

#[test]
fn test_flat_workbook_with_real_date_cells() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flat.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for (col, header) in [
        "Scheme",
        "Category",
        "Transaction No",
        "Purchase Date",
        "Purchase Amount",
        "Redemption Date",
        "Redemption Amount",
    ]
    .iter()
    .enumerate()
    {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "Nippon India Small Cap").unwrap();
    sheet.write_string(1, 1, "Equity").unwrap();
    sheet.write_number(1, 2, 1.0).unwrap();
    sheet
        .write_datetime_with_format(1, 3, &ExcelDateTime::from_ymd(2023, 7, 24).unwrap(), &date_format)
        .unwrap();
    sheet.write_number(1, 4, 20000.0).unwrap();
    sheet
        .write_datetime_with_format(1, 5, &ExcelDateTime::from_ymd(2024, 7, 23).unwrap(), &date_format)
        .unwrap();
    sheet.write_number(1, 6, 26500.75).unwrap();
    workbook.save(&path).unwrap();

    let analysis = analyze_file(&path, &Config::default()).unwrap();
    assert!(analysis.rejected.is_empty(), "rejected: {:?}", analysis.rejected);

    let tx = &analysis.classified[0];
    assert_eq!(tx.transaction.purchase_date, date(2023, 7, 24));
    assert_eq!(tx.transaction.redemption_date, date(2024, 7, 23));
    assert_eq!(tx.holding_days, 365);
    assert_eq!(tx.gain_type, GainType::Ltcg);
    assert_eq!(tx.period, RegulatoryPeriod::After);
    assert_eq!(tx.gain, dec!(6500.75));
}

#[test]
fn test_rejected_rows_point_at_sheet_rows_below_blank_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("offset.xlsx");

    // Sheet rows 1-2 are blank; the header is on row 3
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let rows: [[&str; 7]; 3] = [
        ["Scheme", "Category", "Transaction No", "Purchase Date", "Purchase Amount", "Redemption Date", "Redemption Amount"],
        ["Axis Bluechip Fund", "Equity", "1", "2023-01-01", "10000", "2024-01-02", "12000"],
        ["Axis Bluechip Fund", "Equity", "2", "2023-01-01", "10000", "31/02/2024", "12000"],
    ];
    for (offset, cells) in rows.iter().enumerate() {
        for (col, text) in cells.iter().enumerate() {
            sheet.write_string(2 + offset as u32, col as u16, *text).unwrap();
        }
    }
    workbook.save(&path).unwrap();

    let analysis = analyze_file(&path, &Config::default()).unwrap();
    assert_eq!(analysis.classified.len(), 1);
    assert_eq!(analysis.classified[0].transaction.details.source_row, 4);
    assert_eq!(analysis.rejected.len(), 1);
    assert_eq!(analysis.rejected[0].row, 5);
}

#[test]
fn test_two_digit_years_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short_years.csv");
    std::fs::write(
        &path,
        "Fund Name,Category,Txn No,Purchase Date,Purchase Value,Redemption Date,Redemption Value\n\
         Axis Bluechip Fund,Equity,1,01/01/2020,1000,25/07/24,1500\n\
         Axis Bluechip Fund,Equity,2,01-01-24,1000,2024-08-01,1500\n",
    )
    .unwrap();

    let analysis = analyze_file(&path, &Config::default()).unwrap();
    assert!(analysis.classified.is_empty());
    assert_eq!(analysis.rejected.len(), 2);
    assert_eq!(analysis.rejected[0].field(), "redemption_date");
    assert_eq!(analysis.rejected[1].field(), "purchase_date");
}

#[test]
fn test_missing_required_columns_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.csv");
    std::fs::write(
        &path,
        "Fund Name,Purchase Date,Redemption Date,Redemption Value\nX,2023-01-01,2024-01-01,10\n",
    )
    .unwrap();

    let err = analyze_file(&path, &Config::default()).unwrap_err();
    let input_error = err
        .chain()
        .find_map(|e| e.downcast_ref::<InputError>())
        .expect("input error in chain");
    assert!(matches!(input_error, InputError::MissingColumns(cols) if cols.len() == 2));
}

#[test]
fn test_rows_from_importer_feed_the_analyzer() {
    let rows = vec![
        vec!["Fund", "Txn", "Purchase Date", "Purchase Value", "Redemption Date", "Redemption Value"],
        vec!["Equity Fund A", "1", "Jan 01, 2023", "₹10,000", "Jan 01, 2024", "₹8,000"],
    ]
    .into_iter()
    .map(|r| r.into_iter().map(String::from).collect())
    .collect::<Vec<Vec<String>>>();

    let raw: Vec<RawRow> = importers::parse_rows(&rows).unwrap();
    let catalog = FundCatalog::new(&Default::default(), &[mftax::config::CategoryRule {
        contains: "equity".to_string(),
        category: FundCategory::Equity,
    }]);
    let analysis = analyze_rows(raw, &TaxRules::default(), &catalog);

    // 365 days, loss kept signed in the LTCG bucket
    let tx = &analysis.classified[0];
    assert_eq!(tx.holding_days, 365);
    assert_eq!(tx.gain_type, GainType::Ltcg);
    assert_eq!(analysis.summary.period(RegulatoryPeriod::Before).total_ltcg, dec!(-2000));
}

#[test]
fn test_reanalysis_is_deterministic() {
    let first = kuvera_analysis();
    let second = kuvera_analysis();
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.classified, second.classified);
}
