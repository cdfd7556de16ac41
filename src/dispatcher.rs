//! Command dispatcher that routes parsed clap commands to their handlers.

mod analyze;
mod inspect;

use anyhow::Result;

use crate::cli::{AnalyzeArgs, Cli, Commands};

/// Route a parsed command line to its handler. No subcommand means
/// `analyze` with every option at its default.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Analyze(args)) => analyze::dispatch_analyze(&args, cli.json),
        Some(Commands::Inspect { file, rows }) => inspect::dispatch_inspect(&file, rows),
        None => analyze::dispatch_analyze(&AnalyzeArgs::default(), cli.json),
    }
}
