//! Littlejohn: run the same command once per CSV row, in parallel.
//!
//! This is the main entry point for the `littlejohn` CLI. It parses
//! arguments, performs the run and maps fatal errors to exit codes.

mod argv;
mod cli;
mod commands;
mod config;
mod error;
mod exit_codes;
mod logging;
mod output;
mod pool;
mod rows;
mod runner;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
