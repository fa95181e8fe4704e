//! Reference token scanning.
//!
//! Finds every substring of a formula that denotes a cell, a range or a
//! sheet/document-qualified address. Tokens are reported left to right with
//! their byte spans so callers can splice replacements into the original text.
//!
//! Not reported:
//! - text inside string literals (`"A1"`)
//! - function names that happen to look like addresses (`LOG10(`)
//! - addresses glued to a longer identifier or number (`Revenue2023`, `1E10`)

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use super::reference::{Reference, reference_pattern};

/// A reference-shaped substring of a formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefToken {
    /// Byte range in the scanned formula.
    pub span: Range<usize>,
    pub text: String,
}

impl RefToken {
    /// Parse the token. None means the token is malformed, e.g. `A0`.
    pub fn parse(&self) -> Option<Reference> {
        Reference::parse(&self.text)
    }
}

/// Scan `formula` for reference tokens, left to right.
pub fn scan_references(formula: &str) -> Vec<RefToken> {
    let masked = mask_string_literals(formula);
    let mut tokens = Vec::new();

    for m in token_re().find_iter(&masked) {
        if !is_token_boundary(&masked, m.start(), m.end()) {
            continue;
        }
        tokens.push(RefToken {
            span: m.range(),
            text: formula[m.range()].to_string(),
        });
    }

    tokens
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&reference_pattern()).expect("reference token regex must compile"))
}

fn is_token_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    if before.is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | '\'' | '#')) {
        return false;
    }
    let after = text[end..].chars().next();
    !after.is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '(' | '.' | '$'))
}

/// Blank out string literal contents, keeping byte offsets stable.
/// Calc escapes a quote inside a literal by doubling it, which this
/// handles naturally by closing and reopening. Quoted sheet and document
/// names (`'Q"1'.A1`) are copied as-is so a `"` inside them opens nothing.
fn mask_string_literals(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut in_string = false;
    let mut in_quoted_name = false;

    for ch in formula.chars() {
        if in_string {
            if ch == '"' {
                in_string = false;
                out.push('"');
            } else {
                for _ in 0..ch.len_utf8() {
                    out.push(' ');
                }
            }
            continue;
        }
        match ch {
            '\'' => in_quoted_name = !in_quoted_name,
            '"' if !in_quoted_name => in_string = true,
            _ => {}
        }
        out.push(ch);
    }

    out
}
