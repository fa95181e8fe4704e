//! Error types for Gridflat core.

use thiserror::Error;

use gridflat_engine::FlattenError;

/// Errors that can occur while loading a workbook or flattening a cell
#[derive(Error, Debug)]
pub enum GridflatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),

    #[error("Workbook has no sheets")]
    EmptyWorkbook,

    #[error(transparent)]
    Flatten(#[from] FlattenError),
}

pub type Result<T> = std::result::Result<T, GridflatError>;
