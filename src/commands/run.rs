//! The batch run: CSV rows in, one child per row, merged output out.

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{LittlejohnError, Result};
use crate::output::{self, Aggregator};
use crate::pool::{self, PoolStats, Template};
use crate::rows::RowSource;
use crate::runner::{DryRunLauncher, Launcher, ProcessLauncher};
use crossbeam_channel::bounded;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub csv: PathBuf,
    /// `None` writes to standard output.
    pub output: Option<PathBuf>,
    pub jobs: usize,
    pub dry_run: bool,
    pub program: String,
    pub fixed_args: Vec<String>,
    /// Aggregation channel slots per worker.
    pub output_buffer: usize,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub pool: PoolStats,
    /// Lines the aggregator wrote to the sink.
    pub written: u64,
}

impl RunSettings {
    /// Merge CLI flags over config defaults. CLI values win.
    pub fn resolve(cli: Cli, config: &Config) -> Result<Self> {
        let jobs = cli.jobs.unwrap_or(config.jobs);
        if jobs == 0 {
            return Err(LittlejohnError::UserError(
                "--jobs must be at least 1".to_string(),
            ));
        }

        if cli.program.is_empty() {
            return Err(LittlejohnError::UserError(
                "program to run must not be empty".to_string(),
            ));
        }

        let output = match cli.output {
            Some(path) if path.is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => config.output_path().map(Path::to_path_buf),
        };

        Ok(Self {
            csv: cli.csv,
            output,
            jobs,
            dry_run: cli.dry_run,
            program: cli.program,
            fixed_args: cli.args,
            output_buffer: config.output_buffer,
        })
    }
}

/// Run the program once per CSV row and collect its output.
///
/// Setup failures (CSV, header, output file) return before any worker starts.
/// Per-row and per-child failures are logged and counted in the summary.
pub fn run(settings: &RunSettings) -> Result<RunSummary> {
    let rows = RowSource::open(&settings.csv)?;
    let sink = output::open_sink(settings.output.as_deref())?;

    let template = Arc::new(Template {
        command: settings.program.clone(),
        fixed_args: settings.fixed_args.clone(),
        names: Arc::clone(rows.header()),
    });
    let launcher: Arc<dyn Launcher> = if settings.dry_run {
        Arc::new(DryRunLauncher)
    } else {
        Arc::new(ProcessLauncher)
    };

    let (lines_tx, lines_rx) = bounded(settings.jobs.saturating_mul(settings.output_buffer.max(1)));
    let aggregator = Aggregator::spawn(sink, lines_rx)?;

    let dispatched = pool::dispatch(rows, settings.jobs, template, launcher, &lines_tx);

    // Workers hold their own clones; dropping ours lets the aggregator drain
    // to completion once they are gone.
    drop(lines_tx);
    let written = aggregator.finish();

    let pool = dispatched?;
    let written = written?;

    Ok(RunSummary { pool, written })
}
