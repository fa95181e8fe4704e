//! Workbook loaders

mod csv;
mod parser;

pub use csv::{parse_csv, parse_csv_content};
pub use parser::{DEFAULT_SHEET_NAME, parse_grd, parse_grd_content};

use crate::document::Workbook;
use crate::error::Result;
use std::path::Path;

/// Load a workbook, choosing the format from the file extension
/// (`.csv` for CSV, anything else is read as .grd).
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        parse_csv(path)
    } else {
        parse_grd(path)
    }
}
