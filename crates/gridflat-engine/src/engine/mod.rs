//! Formula flattening engine API.
//!
//! - [`CellRef`], [`Address`], [`Reference`] - Cell and reference parsing (Calc A1 notation)
//! - [`Cell`], [`CellType`], [`Literal`], [`Grid`] - Data structures for cell storage
//! - [`scan_references`] - Find reference tokens in formula text
//! - [`CellSource`] - Read-only view of a workbook used during expansion
//! - [`flatten`], [`Flattener`] - Recursive substitution of referenced formulas

mod cell;
mod cell_ref;
mod flatten;
mod format;
mod reference;
mod scan;
mod source;

pub use cell::{Cell, CellType, FORMULA_MARKER, Grid, Literal, parse_boolean, parse_finite_number};
pub use cell_ref::{CellRef, MAX_COLS, MAX_ROWS};
pub use flatten::{FlattenOptions, Flattener, flatten};
pub use format::format_number;
pub use reference::{Address, Reference, sheet_names_match};
pub use scan::{RefToken, scan_references};
pub use source::{CellSource, RefKind};
