//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`; result lines never do.
//! `RUST_LOG` wins over everything else when set.

use tracing_subscriber::EnvFilter;

/// Pick the filter directive from the verbosity flags and configured level.
pub fn filter_directive(verbose: bool, quiet: bool, configured: &str) -> String {
    if verbose {
        "debug".to_string()
    } else if quiet {
        "error".to_string()
    } else {
        configured.to_string()
    }
}

/// Build the filter: a parseable `env_value` (from `RUST_LOG`) wins over `directive`.
pub fn build_filter(env_value: Option<&str>, directive: &str) -> EnvFilter {
    env_value
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(directive))
}

/// Install the global stderr subscriber. Safe to call more than once.
pub fn init(directive: &str) {
    let env_value = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env_value.as_deref(), directive);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
