//! Cell data structures for a sheet.
//!
//! - [`CellType`] - The content stored in a cell (empty, text, number, boolean or formula)
//! - [`Literal`] - A terminal value as seen by the flattener
//! - [`Cell`] - A stored cell
//! - [`Grid`] - Sparse storage for one sheet's cells (backed by `DashMap`)

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::cell_ref::CellRef;
use super::format::format_number;

/// Leading character marking a cell's content as a formula.
pub const FORMULA_MARKER: char = '=';

/// The type of content stored in a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Formula body without the leading marker.
    Formula(String),
}

/// A terminal cell value. Formulas never appear here.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl Literal {
    /// Render the value as formula source text, or None for an empty cell
    /// (there is no literal that stands in for "nothing").
    pub fn to_formula_text(&self) -> Option<String> {
        match self {
            Literal::Empty => None,
            Literal::Number(n) if *n < 0.0 => Some(format!("({})", format_number(*n))),
            Literal::Number(n) => Some(format_number(*n)),
            Literal::Text(s) => Some(format!("\"{}\"", s.replace('"', "\"\""))),
            Literal::Boolean(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }
}

/// A cell in a sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub contents: CellType,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell {
            contents: CellType::Empty,
        }
    }

    pub fn new_text(text: &str) -> Cell {
        Cell {
            contents: CellType::Text(text.to_string()),
        }
    }

    pub fn new_number(n: f64) -> Cell {
        Cell {
            contents: CellType::Number(n),
        }
    }

    pub fn new_boolean(b: bool) -> Cell {
        Cell {
            contents: CellType::Boolean(b),
        }
    }

    /// Create a formula cell from its body (no leading marker).
    pub fn new_formula(body: &str) -> Cell {
        Cell {
            contents: CellType::Formula(body.to_string()),
        }
    }

    /// Parse user input and create appropriate cell type.
    /// - Empty string or whitespace -> Empty
    /// - Starts with '=' -> Formula (without the '=')
    /// - Quoted string -> Text (without quotes)
    /// - TRUE / FALSE (any case) -> Boolean
    /// - Finite number -> Number
    /// - Otherwise -> Text
    pub fn from_input(input: &str) -> Cell {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Cell::new_empty();
        }

        if let Some(body) = trimmed.strip_prefix(FORMULA_MARKER) {
            return Cell::new_formula(body);
        }

        if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
            return Cell::new_text(&trimmed[1..trimmed.len() - 1]);
        }

        if let Some(b) = parse_boolean(trimmed) {
            return Cell::new_boolean(b);
        }

        if let Some(n) = parse_finite_number(trimmed) {
            return Cell::new_number(n);
        }

        Cell::new_text(trimmed)
    }

    /// Full formula text including the marker, if this is a formula cell.
    pub fn formula(&self) -> Option<String> {
        match &self.contents {
            CellType::Formula(body) => Some(format!("{}{}", FORMULA_MARKER, body)),
            _ => None,
        }
    }

    /// The cell's terminal value. Formula cells report `Empty`; their value
    /// is never computed here.
    pub fn literal(&self) -> Literal {
        match &self.contents {
            CellType::Empty | CellType::Formula(_) => Literal::Empty,
            CellType::Text(s) => Literal::Text(s.clone()),
            CellType::Number(n) => Literal::Number(*n),
            CellType::Boolean(b) => Literal::Boolean(*b),
        }
    }
}

pub fn parse_boolean(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("TRUE") {
        Some(true)
    } else if s.eq_ignore_ascii_case("FALSE") {
        Some(false)
    } else {
        None
    }
}

/// Parse a number, rejecting `inf`/`NaN` spellings that `f64::from_str` accepts.
pub fn parse_finite_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Sparse cell storage for one sheet.
pub type Grid = DashMap<CellRef, Cell>;
