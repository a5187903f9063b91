//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Defaults for a littlejohn run, read from an optional YAML file.
///
/// Every field can be overridden from the command line. Unknown fields in
/// the YAML are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of parallel workers.
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Output file path. Empty means standard output.
    #[serde(default)]
    pub output: String,

    /// Tracing filter directive (e.g. "info", "littlejohn=debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Aggregation channel capacity per worker.
    #[serde(default = "default_output_buffer")]
    pub output_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            output: String::new(),
            log_level: default_log_level(),
            output_buffer: default_output_buffer(),
        }
    }
}
