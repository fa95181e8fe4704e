//! Formula flattening.
//!
//! Every same-sheet reference to a formula cell is replaced by that cell's
//! own formula, wrapped in parentheses, until only terminal references are
//! left. Terminal references are:
//!
//! - value cells, substituted by their literal text (or kept, see
//!   [`FlattenOptions::substitute_values`])
//! - ranges (`B1:B10`)
//! - references into another sheet or document (`Sheet2.B1`)
//!
//! Expansion runs on an explicit stack of frames, one per cell being
//! expanded, so chain length is bounded by `max_depth` and never by the
//! thread's stack. A reference back into the chain fails with
//! [`FlattenError::CyclicReference`].

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::vec;

use super::cell::FORMULA_MARKER;
use super::reference::Address;
use super::scan::{RefToken, scan_references};
use super::source::{CellSource, RefKind};
use crate::error::{FlattenError, Result};

const DEFAULT_MAX_DEPTH: usize = 256;

/// Tuning for a flattening run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    /// Replace references to value cells with the value itself. When false,
    /// value references are left as written.
    pub substitute_values: bool,
    /// Deepest chain of nested formula substitutions allowed.
    pub max_depth: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            substitute_values: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Flatten the formula in `start` with default options.
pub fn flatten<S: CellSource + ?Sized>(source: &S, start: &Address) -> Result<String> {
    Flattener::new(source).flatten(start)
}

pub struct Flattener<'a, S: ?Sized> {
    source: &'a S,
    options: FlattenOptions,
}

/// One cell being expanded: its formula body, the tokens not yet visited
/// and the text produced so far.
struct Frame {
    address: Address,
    body: String,
    tokens: vec::IntoIter<RefToken>,
    last: usize,
    out: String,
}

impl Frame {
    fn new(address: Address, body: String) -> Frame {
        let tokens = scan_references(&body).into_iter();
        Frame {
            address,
            out: String::with_capacity(body.len()),
            body,
            tokens,
            last: 0,
        }
    }
}

/// What to do with one reference token.
enum Step {
    Emit(String),
    Descend(Address, String),
}

/// Cells on the current expansion chain, outermost first.
#[derive(Default)]
struct ExpansionPath {
    frames: Vec<Frame>,
    in_flight: HashSet<Address>,
}

impl ExpansionPath {
    fn depth(&self) -> usize {
        self.frames.len()
    }

    fn contains(&self, address: &Address) -> bool {
        self.in_flight.contains(address)
    }

    fn enter(&mut self, address: Address, body: String) {
        self.in_flight.insert(address.clone());
        self.frames.push(Frame::new(address, body));
    }

    fn leave(&mut self) -> Option<Frame> {
        let frame = self.frames.pop()?;
        self.in_flight.remove(&frame.address);
        Some(frame)
    }

    /// The chain from the first visit of `repeated` back to itself.
    fn cycle_through(&self, repeated: &Address) -> Vec<Address> {
        let first = self
            .frames
            .iter()
            .position(|f| &f.address == repeated)
            .unwrap_or(0);
        let mut cycle: Vec<Address> = self.frames[first..]
            .iter()
            .map(|f| f.address.clone())
            .collect();
        cycle.push(repeated.clone());
        cycle
    }
}

impl<'a, S: CellSource + ?Sized> Flattener<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Flattener {
            source,
            options: FlattenOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FlattenOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Flatten the formula held by `start`. The result keeps the leading `=`.
    pub fn flatten(&self, start: &Address) -> Result<String> {
        let no_formula = || FlattenError::NoFormula {
            address: start.clone(),
        };
        let formula = self.source.formula(start).ok_or_else(no_formula)?;
        let body = formula.strip_prefix(FORMULA_MARKER).ok_or_else(no_formula)?;
        debug!("flattening {} = {}", start, formula);

        let mut path = ExpansionPath::default();
        path.enter(start.clone(), body.to_string());
        let mut flat = String::new();

        while let Some(frame) = path.frames.last_mut() {
            let Some(token) = frame.tokens.next() else {
                frame.out.push_str(&frame.body[frame.last..]);
                let Some(done) = path.leave() else { break };
                match path.frames.last_mut() {
                    Some(parent) => {
                        parent.out.push('(');
                        parent.out.push_str(&done.out);
                        parent.out.push(')');
                    }
                    None => flat = done.out,
                }
                continue;
            };

            frame.out.push_str(&frame.body[frame.last..token.span.start]);
            frame.last = token.span.end;

            match self.resolve(&frame.address, &token)? {
                Step::Emit(text) => frame.out.push_str(&text),
                Step::Descend(target, inner_body) => {
                    if path.contains(&target) {
                        return Err(FlattenError::CyclicReference {
                            path: path.cycle_through(&target),
                        });
                    }
                    if path.depth() > self.options.max_depth {
                        return Err(FlattenError::DepthExceeded {
                            max_depth: self.options.max_depth,
                        });
                    }
                    path.enter(target, inner_body);
                }
            }
        }

        Ok(format!("{}{}", FORMULA_MARKER, flat))
    }

    fn resolve(&self, at: &Address, token: &RefToken) -> Result<Step> {
        let unresolved = || FlattenError::UnresolvedReference {
            token: token.text.clone(),
            address: at.clone(),
        };
        let reference = token.parse().ok_or_else(unresolved)?;
        let kind = self.source.classify(&at.sheet, &reference);
        trace!("{}: {} is {:?}", at, token.text, kind);

        match kind {
            RefKind::Range | RefKind::CrossSheet => Ok(Step::Emit(token.text.clone())),
            RefKind::Value => {
                let literal = match reference.address(&at.sheet) {
                    Some(target) if self.options.substitute_values => {
                        self.source.value(&target).to_formula_text()
                    }
                    _ => None,
                };
                Ok(Step::Emit(literal.unwrap_or_else(|| token.text.clone())))
            }
            RefKind::Formula => {
                let target = reference.address(&at.sheet).ok_or_else(unresolved)?;
                let formula = self.source.formula(&target).ok_or_else(unresolved)?;
                debug!("{}: expanding {} = {}", at, target, formula);
                let inner_body = match formula.strip_prefix(FORMULA_MARKER) {
                    Some(body) => body.to_string(),
                    None => formula,
                };
                Ok(Step::Descend(target, inner_body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Cell, CellRef, Literal};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// In-memory stand-in for a host workbook.
    #[derive(Default)]
    struct FakeBook {
        cells: HashMap<Address, Cell>,
    }

    impl FakeBook {
        fn with(mut self, sheet: &str, cell: &str, input: &str) -> Self {
            let cell_ref = CellRef::from_str(cell).unwrap();
            self.cells
                .insert(Address::new(sheet, cell_ref), Cell::from_input(input));
            self
        }
    }

    impl CellSource for FakeBook {
        fn formula(&self, address: &Address) -> Option<String> {
            self.cells.get(address).and_then(Cell::formula)
        }

        fn value(&self, address: &Address) -> Literal {
            self.cells
                .get(address)
                .map(Cell::literal)
                .unwrap_or(Literal::Empty)
        }
    }

    fn a(cell: &str) -> Address {
        Address::new("Sheet1", CellRef::from_str(cell).unwrap())
    }

    #[test]
    fn test_value_cell_reports_no_formula() {
        let book = FakeBook::default().with("Sheet1", "A1", "42");
        let err = flatten(&book, &a("A1")).unwrap_err();
        assert_eq!(err, FlattenError::NoFormula { address: a("A1") });
    }

    #[test]
    fn test_missing_cell_reports_no_formula() {
        let book = FakeBook::default();
        assert!(matches!(
            flatten(&book, &a("C9")),
            Err(FlattenError::NoFormula { .. })
        ));
    }

    #[test]
    fn test_substitutes_values() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=B1+C1")
            .with("Sheet1", "B1", "5")
            .with("Sheet1", "C1", "10");
        assert_eq!(flatten(&book, &a("A1")).unwrap(), "=5+10");
    }

    #[test]
    fn test_expands_formula_chain_with_parentheses() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=B1*2")
            .with("Sheet1", "B1", "=C1+1")
            .with("Sheet1", "C1", "3");
        assert_eq!(flatten(&book, &a("A1")).unwrap(), "=(3+1)*2");
    }

    #[test]
    fn test_cross_sheet_reference_is_terminal() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=Sheet2.B1+1")
            .with("Sheet2", "B1", "=C1*100");
        assert_eq!(flatten(&book, &a("A1")).unwrap(), "=Sheet2.B1+1");
    }

    #[test]
    fn test_external_reference_is_terminal() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "='file:///tmp/x.ods'#$Sheet1.B1+1")
            .with("Sheet1", "B1", "=7");
        assert_eq!(
            flatten(&book, &a("A1")).unwrap(),
            "='file:///tmp/x.ods'#$Sheet1.B1+1"
        );
    }

    #[test]
    fn test_range_reference_is_terminal() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=SUM(B1:B10)")
            .with("Sheet1", "B1", "=C1");
        assert_eq!(flatten(&book, &a("A1")).unwrap(), "=SUM(B1:B10)");
    }

    #[test]
    fn test_same_sheet_qualified_reference_expands() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=$Sheet1.$B$1/2")
            .with("Sheet1", "B1", "=C1-D1")
            .with("Sheet1", "C1", "9")
            .with("Sheet1", "D1", "4");
        assert_eq!(flatten(&book, &a("A1")).unwrap(), "=(9-4)/2");
    }

    #[test]
    fn test_quoted_same_sheet_reference_expands() {
        let book = FakeBook::default()
            .with("My Sheet", "A1", "='My Sheet'.B1*2")
            .with("My Sheet", "B1", "=C1+1")
            .with("My Sheet", "C1", "3");
        let start = Address::new("My Sheet", CellRef::new(0, 0));
        assert_eq!(flatten(&book, &start).unwrap(), "=(3+1)*2");
    }

    #[test]
    fn test_nested_chain_on_other_sheet() {
        let book = FakeBook::default()
            .with("Data", "A1", "=B1+B2")
            .with("Data", "B1", "=C1*C1")
            .with("Data", "C1", "2")
            .with("Data", "B2", "=Sheet1.A1");
        let start = Address::new("Data", CellRef::new(0, 0));
        assert_eq!(flatten(&book, &start).unwrap(), "=(2*2)+(Sheet1.A1)");
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=(3+1)*2+SUM(B1:B3)+Sheet2.A1")
            .with("Sheet1", "B1", "=C1");
        let once = flatten(&book, &a("A1")).unwrap();
        let book = book.with("Sheet1", "A2", &once);
        assert_eq!(flatten(&book, &a("A2")).unwrap(), once);
    }

    #[test]
    fn test_cycle_is_reported() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=B1+1")
            .with("Sheet1", "B1", "=A1*2");
        let err = flatten(&book, &a("A1")).unwrap_err();
        assert_eq!(
            err,
            FlattenError::CyclicReference {
                path: vec![a("A1"), a("B1"), a("A1")]
            }
        );
    }

    #[test]
    fn test_cycle_through_differently_cased_qualifier() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=B1")
            .with("Sheet1", "B1", "=sheet1.A1");
        let err = flatten(&book, &a("A1")).unwrap_err();
        assert_eq!(
            err,
            FlattenError::CyclicReference {
                path: vec![a("A1"), a("B1"), a("A1")]
            }
        );
    }

    #[test]
    fn test_self_reference_is_reported() {
        let book = FakeBook::default().with("Sheet1", "A1", "=A1+1");
        assert!(matches!(
            flatten(&book, &a("A1")),
            Err(FlattenError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_cycle_below_start_lists_only_the_loop() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=B1")
            .with("Sheet1", "B1", "=C1")
            .with("Sheet1", "C1", "=B1");
        let err = flatten(&book, &a("A1")).unwrap_err();
        assert_eq!(
            err,
            FlattenError::CyclicReference {
                path: vec![a("B1"), a("C1"), a("B1")]
            }
        );
    }

    #[test]
    fn test_shared_precedent_is_not_a_cycle() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=B1+B1")
            .with("Sheet1", "B1", "=C1*2")
            .with("Sheet1", "C1", "4");
        assert_eq!(flatten(&book, &a("A1")).unwrap(), "=(4*2)+(4*2)");
    }

    #[test]
    fn test_malformed_reference_is_unresolved() {
        let book = FakeBook::default().with("Sheet1", "A1", "=A0+1");
        assert_eq!(
            flatten(&book, &a("A1")).unwrap_err(),
            FlattenError::UnresolvedReference {
                token: "A0".into(),
                address: a("A1"),
            }
        );
    }

    #[test]
    fn test_depth_limit() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=B1")
            .with("Sheet1", "B1", "=C1")
            .with("Sheet1", "C1", "=D1")
            .with("Sheet1", "D1", "1");
        let options = FlattenOptions {
            max_depth: 1,
            ..FlattenOptions::default()
        };
        let err = Flattener::new(&book)
            .with_options(options)
            .flatten(&a("A1"))
            .unwrap_err();
        assert_eq!(err, FlattenError::DepthExceeded { max_depth: 1 });

        let options = FlattenOptions {
            max_depth: 2,
            ..FlattenOptions::default()
        };
        let flat = Flattener::new(&book)
            .with_options(options)
            .flatten(&a("A1"))
            .unwrap();
        assert_eq!(flat, "=((1))");
    }

    fn long_chain(len: usize) -> FakeBook {
        let mut book = FakeBook::default();
        for row in 0..len - 1 {
            let next = CellRef::new(0, row + 1);
            book.cells.insert(
                Address::new("Sheet1", CellRef::new(0, row)),
                Cell::from_input(&format!("={}", next)),
            );
        }
        book.cells.insert(
            Address::new("Sheet1", CellRef::new(0, len - 1)),
            Cell::from_input("1"),
        );
        book
    }

    #[test]
    fn test_long_chain_stops_at_default_depth() {
        let book = long_chain(20_000);
        assert_eq!(
            flatten(&book, &a("A1")).unwrap_err(),
            FlattenError::DepthExceeded {
                max_depth: DEFAULT_MAX_DEPTH
            }
        );
    }

    #[test]
    fn test_long_chain_expands_without_depth_limit() {
        let len = 20_000;
        let book = long_chain(len);
        let options = FlattenOptions {
            max_depth: usize::MAX,
            ..FlattenOptions::default()
        };
        let flat = Flattener::new(&book)
            .with_options(options)
            .flatten(&a("A1"))
            .unwrap();
        assert_eq!(flat.len(), 2 + 2 * (len - 1));
        assert!(flat.starts_with("=(("));
        assert!(flat.ends_with("(1))"));
    }

    #[test]
    fn test_keep_values_leaves_value_references() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=B1*C1")
            .with("Sheet1", "B1", "=C1+1")
            .with("Sheet1", "C1", "3");
        let options = FlattenOptions {
            substitute_values: false,
            ..FlattenOptions::default()
        };
        let flat = Flattener::new(&book)
            .with_options(options)
            .flatten(&a("A1"))
            .unwrap();
        assert_eq!(flat, "=(C1+1)*C1");
    }

    #[test]
    fn test_empty_and_text_values() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=CONCATENATE(B1;\" is \";C1;Z99)")
            .with("Sheet1", "B1", "\"x\"")
            .with("Sheet1", "C1", "TRUE");
        assert_eq!(
            flatten(&book, &a("A1")).unwrap(),
            "=CONCATENATE(\"x\";\" is \";TRUE;Z99)"
        );
    }

    #[test]
    fn test_string_literals_are_not_expanded() {
        let book = FakeBook::default()
            .with("Sheet1", "A1", "=IF(B1>0;\"B1 positive\";\"\")")
            .with("Sheet1", "B1", "=C1");
        assert_eq!(
            flatten(&book, &a("A1")).unwrap(),
            "=IF((C1)>0;\"B1 positive\";\"\")"
        );
    }
}
