//! Exit code constants for the littlejohn CLI.
//!
//! - 0: Success (individual child failures do not change this)
//! - 1: User error (bad flags, invalid configuration)
//! - 2: Input failure (CSV cannot be opened or has no readable header)
//! - 3: Output failure (output file cannot be created or written)
//! - 4: Internal failure (a pool thread panicked)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Input failure: the CSV file could not be opened or its header read.
pub const INPUT_FAILURE: i32 = 2;

/// Output failure: the output destination could not be created or written.
pub const OUTPUT_FAILURE: i32 = 3;

/// Internal failure: a worker or aggregator thread panicked.
pub const INTERNAL_FAILURE: i32 = 4;
