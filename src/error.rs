//! Error types for the command line front-end

use thiserror::Error;

/// Problems with the command line itself (exit code 2).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UsageError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("Invalid number for {flag}: {value}")]
    InvalidNumber { flag: String, value: String },

    #[error("Missing workbook file")]
    MissingFile,

    #[error("Missing cell to flatten")]
    MissingCell,
}
