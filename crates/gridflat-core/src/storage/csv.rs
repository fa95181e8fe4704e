//! CSV import
//!
//! A CSV file saved with "cell formulas" keeps formulas as `=...` text, so a
//! single exported sheet can be flattened without the original document.

use crate::document::Workbook;
use crate::error::Result;
use gridflat_engine::engine::{Cell, CellRef, FORMULA_MARKER, parse_boolean, parse_finite_number};
use std::path::Path;

use super::parser::DEFAULT_SHEET_NAME;

/// Parse a CSV file into a single-sheet workbook named after the file stem.
pub fn parse_csv(path: &Path) -> Result<Workbook> {
    let content = std::fs::read_to_string(path)?;
    let sheet_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_SHEET_NAME);
    Ok(parse_csv_content(&content, sheet_name))
}

/// Parse CSV text into a workbook with one sheet called `sheet_name`.
pub fn parse_csv_content(content: &str, sheet_name: &str) -> Workbook {
    let mut workbook = Workbook::new();
    let sheet = workbook.sheet_or_insert(sheet_name);

    for (row_idx, line) in content.lines().enumerate() {
        for (col_idx, field) in parse_csv_line(line).into_iter().enumerate() {
            if field.is_empty() {
                continue;
            }
            sheet.set(CellRef::new(col_idx, row_idx), parse_csv_field(&field));
        }
    }

    workbook
}

/// Parse a single CSV line, handling quoted fields
pub(crate) fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => {
                    in_quotes = true;
                    field_was_quoted = true;
                }
                ',' => {
                    if field_was_quoted {
                        fields.push(std::mem::take(&mut current));
                    } else {
                        fields.push(current.trim().to_string());
                        current.clear();
                    }
                    field_was_quoted = false;
                }
                _ => current.push(c),
            }
        }
    }
    if field_was_quoted {
        fields.push(current);
    } else {
        fields.push(current.trim().to_string());
    }
    fields
}

/// Parse a CSV field into an appropriate Cell type
/// - `=...` -> Formula
/// - TRUE / FALSE -> Boolean
/// - Valid number -> Number (unless it has leading zeros like "007")
/// - Otherwise -> Text
pub(crate) fn parse_csv_field(field: &str) -> Cell {
    if let Some(body) = field.strip_prefix(FORMULA_MARKER) {
        return Cell::new_formula(body);
    }

    if let Some(b) = parse_boolean(field) {
        return Cell::new_boolean(b);
    }

    if !has_leading_zero(field) {
        if let Some(n) = parse_finite_number(field) {
            return Cell::new_number(n);
        }
    }

    Cell::new_text(field)
}

fn has_leading_zero(field: &str) -> bool {
    let digits = field.strip_prefix('-').unwrap_or(field);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}
