use anyhow::{bail, Result};
use tracing::info;

use crate::cli::formatters;
use crate::cli::AnalyzeArgs;
use mftax::analyzer::analyze_file;
use mftax::config::Config;
use mftax::reports::{run_timestamp, write_reports};
use mftax::tax::RegulatoryPeriod;

/// Merge command-line overrides into the loaded configuration
fn apply_overrides(config: &mut Config, args: &AnalyzeArgs) {
    if let Some(file) = &args.file {
        config.input = Some(file.clone());
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(cutoff) = args.cutoff {
        config.cutoff_date = cutoff;
    }
    if args.no_timestamp {
        config.timestamp_filenames = false;
    }
}

pub fn dispatch_analyze(args: &AnalyzeArgs, json_output: bool) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    apply_overrides(&mut config, args);

    let input = config.input_path();
    info!("Analyzing {} (cutoff {})", input.display(), config.cutoff_date);

    let analysis = analyze_file(&input, &config)?;

    let reports = if args.dry_run {
        info!("Dry run, no report files written");
        None
    } else {
        let timestamp = config.timestamp_filenames.then(run_timestamp);
        Some(write_reports(&analysis, &config.output_dir, timestamp.as_deref()))
    };

    if json_output {
        println!("{}", formatters::format_analysis_json(&analysis, reports.as_ref()));
    } else {
        print!("{}", formatters::format_input_summary(&analysis));
        print!("{}", formatters::format_summary_table(&analysis));
        for period in RegulatoryPeriod::ALL {
            print!("{}", formatters::format_period_section(&analysis, period));
        }
        if args.show_rejected && analysis.has_rejections() {
            print!("{}", formatters::format_rejected_table(&analysis.rejected));
        }
        if let Some(summary) = &reports {
            print!("{}", formatters::format_report_files(summary, &analysis.rules));
        }
        print!("{}", formatters::format_itr_notes(&analysis.rules));
    }

    // Shown on stderr in JSON mode too, so it is never lost
    if let Some(warning) = formatters::format_rejected_warning(&analysis, args.show_rejected) {
        eprintln!("{}", warning);
    }

    if let Some(summary) = &reports {
        if !summary.is_success() {
            bail!(
                "{} of {} report file(s) could not be written",
                summary.failed.len(),
                summary.failed.len() + summary.written.len()
            );
        }
    }

    Ok(())
}
