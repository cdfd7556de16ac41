use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "mftax")]
#[command(
    version,
    about = "Mutual fund capital gains split around the July 23, 2024 tax change"
)]
#[command(
    long_about = "Split mutual fund redemptions into before/after July 23, 2024, classify gains as STCG or LTCG, and write CSV summaries for ITR filing. Running without a subcommand analyzes the default input file."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a capital gains export and write the CSV reports
    Analyze(AnalyzeArgs),

    /// Inspect Excel/CSV file structure
    Inspect {
        /// Path to the Excel or CSV file
        file: PathBuf,

        /// Number of rows to show per sheet
        #[arg(short, long, default_value_t = 10)]
        rows: usize,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct AnalyzeArgs {
    /// Path to the Excel or CSV file (default: from config, else 2.xlsx)
    pub file: Option<PathBuf>,

    /// Config file (default: mftax.toml in the working directory, if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the CSV reports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Tax rule change date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cutoff)]
    pub cutoff: Option<NaiveDate>,

    /// Do not append the run timestamp to report file names
    #[arg(long)]
    pub no_timestamp: bool,

    /// Analyze and print, but write no files
    #[arg(short, long)]
    pub dry_run: bool,

    /// List every rejected row
    #[arg(long)]
    pub show_rejected: bool,
}

fn parse_cutoff(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}
