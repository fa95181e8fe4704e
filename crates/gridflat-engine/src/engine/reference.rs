//! Sheet-qualified addresses and parsed reference tokens.
//!
//! Calc A1 syntax qualifies a cell with its sheet using a dot
//! (`Sheet2.B1`, `$Sheet2.$B$1`, `'My Sheet'.B1`) and an external document
//! with a quoted URL followed by `#` (`'file:///data.ods'#$Sheet1.A1`).
//! Ranges join two cells with a colon (`B1:B10`, `Sheet2.A1:B2`).

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::cell_ref::CellRef;

pub(crate) const DOCUMENT_PATTERN: &str = r"'(?:[^']|'')*'";
pub(crate) const SHEET_PATTERN: &str = r"\$?(?:'(?:[^']|'')+'|[A-Za-z_][A-Za-z0-9_]*)";
pub(crate) const CELL_PATTERN: &str = r"\$?[A-Za-z]{1,3}\$?[0-9]+";

/// Regex source for one reference token, with named groups
/// `doc`, `sheet`, `cell`, `end_sheet` and `end`.
pub(crate) fn reference_pattern() -> String {
    format!(
        r"(?:(?<doc>{doc})#)?(?:(?<sheet>{sheet})\.)?(?<cell>{cell})(?::(?:(?<end_sheet>{sheet})\.)?(?<end>{cell}))?",
        doc = DOCUMENT_PATTERN,
        sheet = SHEET_PATTERN,
        cell = CELL_PATTERN,
    )
}

fn anchored_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("^{}$", reference_pattern()))
            .expect("anchored reference regex must compile")
    })
}

/// A fully qualified cell: sheet name plus position.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Address {
    pub sheet: String,
    pub cell: CellRef,
}

impl Address {
    pub fn new(sheet: impl Into<String>, cell: CellRef) -> Address {
        Address {
            sheet: sheet.into(),
            cell,
        }
    }

    /// Parse `B3` (resolved against `default_sheet`) or `Sheet2.B3`.
    pub fn parse(text: &str, default_sheet: &str) -> Option<Address> {
        let reference = Reference::parse(text.trim())?;
        if reference.document.is_some() || reference.is_range() {
            return None;
        }
        let sheet = reference.sheet.unwrap_or_else(|| default_sheet.to_string());
        Some(Address::new(sheet, reference.cell))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", quote_sheet_name(&self.sheet), self.cell)
    }
}

/// A reference token parsed out of formula text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    /// External document URL, unquoted.
    pub document: Option<String>,
    /// Sheet qualifier with `$` and quoting removed.
    pub sheet: Option<String>,
    pub cell: CellRef,
    /// Second corner when the token is a range.
    pub range_end: Option<CellRef>,
}

impl Reference {
    /// Parse a whole reference token. Returns None when the token is not a
    /// reference or names a cell outside the sheet bounds.
    pub fn parse(token: &str) -> Option<Reference> {
        let caps = anchored_reference_re().captures(token)?;
        let document = caps.name("doc").map(|m| unquote(m.as_str()));
        let sheet = caps.name("sheet").map(|m| normalize_sheet_name(m.as_str()));
        let cell = CellRef::from_str(&caps["cell"])?;
        let range_end = match caps.name("end") {
            Some(end) => Some(CellRef::from_str(end.as_str())?),
            None => None,
        };

        Some(Reference {
            document,
            sheet,
            cell,
            range_end,
        })
    }

    pub fn is_range(&self) -> bool {
        self.range_end.is_some()
    }

    pub fn is_external(&self) -> bool {
        self.document.is_some()
    }

    /// True when the reference leaves `current_sheet`, either through an
    /// external document or a qualifier naming another sheet.
    pub fn leaves_sheet(&self, current_sheet: &str) -> bool {
        if self.is_external() {
            return true;
        }
        match &self.sheet {
            Some(sheet) => !sheet_names_match(sheet, current_sheet),
            None => false,
        }
    }

    /// Resolve to a single address, using `current_sheet` when unqualified
    /// or when the qualifier names the current sheet in another spelling,
    /// so equal cells always compare equal.
    /// Ranges and external references have no single address.
    pub fn address(&self, current_sheet: &str) -> Option<Address> {
        if self.is_range() || self.is_external() {
            return None;
        }
        let sheet = match self.sheet.as_deref() {
            Some(sheet) if !sheet_names_match(sheet, current_sheet) => sheet,
            _ => current_sheet,
        };
        Some(Address::new(sheet, self.cell))
    }
}

/// Sheet names are compared case-insensitively, as Calc does.
pub fn sheet_names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

fn normalize_sheet_name(raw: &str) -> String {
    unquote(raw.strip_prefix('$').unwrap_or(raw))
}

fn unquote(raw: &str) -> String {
    match raw.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => raw.to_string(),
    }
}

fn quote_sheet_name(name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}
