//! Parser for the .grd workbook format
//!
//! ```text
//! # comment
//! [Sheet1]
//! A1: =B1*2
//! B1: 21
//! C1: "text"
//! D1: TRUE
//! ```
//!
//! Cells listed before the first `[Sheet]` header belong to `Sheet1`.

use crate::document::Workbook;
use crate::error::{GridflatError, Result};
use gridflat_engine::engine::{
    Cell, CellRef, FORMULA_MARKER, parse_boolean, parse_finite_number,
};
use std::fs;
use std::path::Path;

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Parse a .grd file and return a Workbook
pub fn parse_grd(path: &Path) -> Result<Workbook> {
    let content = fs::read_to_string(path)?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string
pub fn parse_grd_content(content: &str) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let mut current_sheet = DEFAULT_SHEET_NAME.to_string();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header.strip_suffix(']').map(str::trim).unwrap_or("");
            if name.is_empty() {
                return Err(GridflatError::Parse {
                    line: line_num + 1,
                    message: "Expected '[SHEET NAME]' header".to_string(),
                });
            }
            workbook.sheet_or_insert(name);
            current_sheet = name.to_string();
            continue;
        }

        // Parse "CELLREF: VALUE" format
        let Some((cell_ref_str, value_str)) = line.split_once(':') else {
            return Err(GridflatError::Parse {
                line: line_num + 1,
                message: "Expected 'CELLREF: VALUE' format".to_string(),
            });
        };

        let cell_ref_str = cell_ref_str.trim();
        let cell_ref = CellRef::from_str(cell_ref_str).ok_or_else(|| GridflatError::Parse {
            line: line_num + 1,
            message: format!("Invalid cell reference: {}", cell_ref_str),
        })?;

        let cell = parse_cell_value(value_str, line_num + 1)?;
        workbook.sheet_or_insert(&current_sheet).set(cell_ref, cell);
    }

    Ok(workbook)
}

/// Parse a cell value string into a Cell
fn parse_cell_value(value: &str, line_num: usize) -> Result<Cell> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(Cell::new_empty());
    }

    if let Some(body) = value.strip_prefix(FORMULA_MARKER) {
        return Ok(Cell::new_formula(body.trim_start()));
    }

    // Quoted string: starts and ends with '"'
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let text = &value[1..value.len() - 1];
        return Ok(Cell::new_text(&unescape_grd_text(text)));
    }

    if let Some(b) = parse_boolean(value) {
        return Ok(Cell::new_boolean(b));
    }

    if let Some(n) = parse_finite_number(value) {
        return Ok(Cell::new_number(n));
    }

    Err(GridflatError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", value),
    })
}

fn unescape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}
