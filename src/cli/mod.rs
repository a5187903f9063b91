//! CLI argument parsing for littlejohn.
//!
//! Uses clap derive macros for declarative argument definitions.
//! The run itself lives in the `commands` module.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Littlejohn: run the same command once per CSV row, with argument management.
///
/// The CSV header names the flags; each data row supplies their values. For
/// header `name,count` and row `alice,3`, `littlejohn -c args.csv echo -- hello`
/// runs `echo hello name alice count 3`.
#[derive(Parser, Debug)]
#[command(name = "littlejohn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of parallel copies to run [default: 4, or `jobs` from --config].
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Just print out commands rather than run them.
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// File with CSV arguments for the program.
    #[arg(short = 'c', long = "csv", value_name = "FILE")]
    pub csv: PathBuf,

    /// File to write output to (empty or omitted writes to stdout).
    #[arg(short = 'o', long = "outputfile", value_name = "FILE")]
    pub output: Option<String>,

    /// YAML file with defaults for jobs, output, log level and buffering.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug diagnostics to stderr.
    #[arg(short, long, action = ArgAction::SetTrue, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors to stderr.
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub quiet: bool,

    /// Program to run.
    #[arg(value_name = "PROG")]
    pub program: String,

    /// Fixed arguments passed to every child before the per-row pairs.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
