//! Command implementation for littlejohn.
//!
//! Resolves the effective settings from the CLI and the optional config file,
//! installs logging and performs the run.

mod run;

pub use run::{RunSettings, run};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::logging;

/// Execute a parsed command line.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    logging::init(&logging::filter_directive(
        cli.verbose,
        cli.quiet,
        &config.log_level,
    ));

    let settings = RunSettings::resolve(cli, &config)?;

    tracing::info!("Assembling the merry tasks...");
    let summary = run(&settings)?;
    tracing::info!(
        rows = summary.pool.rows,
        invocations = summary.pool.invocations,
        skipped = summary.pool.skipped,
        failed = summary.pool.failed,
        child_lines = summary.pool.lines,
        written = summary.written,
        "run complete"
    );

    Ok(())
}
