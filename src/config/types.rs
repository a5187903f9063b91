//! Default values for the littlejohn configuration file.
//!
//! Kept as free functions so `#[serde(default = "...")]` and
//! `Config::default()` agree on every value.

/// Worker count used when neither the CLI nor the config file sets one.
pub const DEFAULT_JOBS: usize = 4;

/// Aggregation channel slots per worker.
pub const DEFAULT_OUTPUT_BUFFER: usize = 64;

/// Tracing filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub(crate) fn default_jobs() -> usize {
    DEFAULT_JOBS
}

pub(crate) fn default_output_buffer() -> usize {
    DEFAULT_OUTPUT_BUFFER
}

pub(crate) fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
