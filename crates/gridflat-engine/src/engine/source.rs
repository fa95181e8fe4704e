//! Read-only access to the cells a formula refers to.

use super::cell::Literal;
use super::reference::{Address, Reference};

/// How a reference token is treated during flattening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    /// Single same-sheet cell holding a formula; expanded recursively.
    Formula,
    /// Single same-sheet cell holding a plain value (or nothing).
    Value,
    /// Spans several cells; left as written.
    Range,
    /// Points into another sheet or document; left as written.
    CrossSheet,
}

/// The host's view of a workbook: everything the flattener reads.
pub trait CellSource {
    /// Formula text of a cell, including the leading `=`, if it holds one.
    fn formula(&self, address: &Address) -> Option<String>;

    /// Terminal value of a cell. Missing cells are `Literal::Empty`.
    fn value(&self, address: &Address) -> Literal;

    /// Classify `reference` as seen from a formula on `current_sheet`.
    fn classify(&self, current_sheet: &str, reference: &Reference) -> RefKind {
        if reference.leaves_sheet(current_sheet) {
            return RefKind::CrossSheet;
        }
        if reference.is_range() {
            return RefKind::Range;
        }
        match reference.address(current_sheet) {
            Some(address) if self.formula(&address).is_some() => RefKind::Formula,
            _ => RefKind::Value,
        }
    }
}

impl<S: CellSource + ?Sized> CellSource for &S {
    fn formula(&self, address: &Address) -> Option<String> {
        (**self).formula(address)
    }

    fn value(&self, address: &Address) -> Literal {
        (**self).value(address)
    }

    fn classify(&self, current_sheet: &str, reference: &Reference) -> RefKind {
        (**self).classify(current_sheet, reference)
    }
}
