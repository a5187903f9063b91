//! Error types for the littlejohn CLI.
//!
//! Only setup failures surface here. Row-level and process-level failures are
//! logged where they happen and never abort the batch.

use crate::exit_codes;
use thiserror::Error;

/// Fatal error for a littlejohn run.
#[derive(Error, Debug)]
pub enum LittlejohnError {
    /// Bad arguments or an invalid configuration file.
    #[error("{0}")]
    UserError(String),

    /// The CSV file could not be opened.
    #[error("failed to open CSV file: {0}")]
    InputError(String),

    /// The CSV header row could not be read.
    #[error("failed to read CSV header: {0}")]
    FormatError(String),

    /// The output destination could not be created or written.
    #[error("output failed: {0}")]
    OutputError(String),

    /// A pool thread panicked.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl LittlejohnError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            LittlejohnError::UserError(_) => exit_codes::USER_ERROR,
            LittlejohnError::InputError(_) => exit_codes::INPUT_FAILURE,
            LittlejohnError::FormatError(_) => exit_codes::INPUT_FAILURE,
            LittlejohnError::OutputError(_) => exit_codes::OUTPUT_FAILURE,
            LittlejohnError::InternalError(_) => exit_codes::INTERNAL_FAILURE,
        }
    }
}

/// Result type alias for littlejohn operations.
pub type Result<T> = std::result::Result<T, LittlejohnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = LittlejohnError::UserError("jobs must be at least 1".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn input_and_format_errors_share_exit_code() {
        let open = LittlejohnError::InputError("missing.csv: not found".to_string());
        let header = LittlejohnError::FormatError("empty file".to_string());
        assert_eq!(open.exit_code(), exit_codes::INPUT_FAILURE);
        assert_eq!(header.exit_code(), exit_codes::INPUT_FAILURE);
    }

    #[test]
    fn output_error_has_correct_exit_code() {
        let err = LittlejohnError::OutputError("disk full".to_string());
        assert_eq!(err.exit_code(), exit_codes::OUTPUT_FAILURE);
    }

    #[test]
    fn internal_error_has_correct_exit_code() {
        let err = LittlejohnError::InternalError("worker 2 panicked".to_string());
        assert_eq!(err.exit_code(), exit_codes::INTERNAL_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = LittlejohnError::InputError("args.csv: No such file".to_string());
        assert_eq!(
            err.to_string(),
            "failed to open CSV file: args.csv: No such file"
        );

        let err = LittlejohnError::FormatError("file is empty".to_string());
        assert_eq!(err.to_string(), "failed to read CSV header: file is empty");
    }
}
