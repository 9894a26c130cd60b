use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use tw_core::{Path, Value, World};

use crate::error::{ScriptError, ScriptResult};

/// Comparison operator inside an atom. `=` and `==` are synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=` or `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl CompareOp {
    fn apply(self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Eq => left.loose_eq(right),
            Self::Ne => !left.loose_eq(right),
            Self::Gt => left.loose_cmp(right) == Some(Ordering::Greater),
            Self::Ge => matches!(
                left.loose_cmp(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Lt => left.loose_cmp(right) == Some(Ordering::Less),
            Self::Le => matches!(
                left.loose_cmp(right),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        };
        f.write_str(s)
    }
}

/// A single test: a path read for truthiness, or `path OP literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Variable id or colon path on the left.
    pub path: String,
    /// Operator and right-hand literal, if any.
    pub comparison: Option<(CompareOp, Value)>,
    /// Byte range of the whole atom.
    pub span: Range<usize>,
}

impl Atom {
    /// Parse an atom run produced by the scanner.
    pub fn parse(text: &str, span: Range<usize>) -> ScriptResult<Self> {
        let Some((at, op, len)) = find_operator(text) else {
            check_path(text, span.clone())?;
            return Ok(Self {
                path: text.to_string(),
                comparison: None,
                span,
            });
        };

        let lhs = text[..at].trim();
        let rhs = text[at + len..].trim();
        if lhs.is_empty() {
            return Err(ScriptError::syntax(
                format!("missing left-hand side of `{op}`"),
                span,
            ));
        }
        if rhs.is_empty() {
            return Err(ScriptError::syntax(
                format!("missing right-hand side of `{op}`"),
                span,
            ));
        }
        check_path(lhs, span.start..span.start + at)?;

        Ok(Self {
            path: lhs.to_string(),
            comparison: Some((op, literal(rhs))),
            span,
        })
    }

    /// Resolve the path and apply the comparison.
    pub fn evaluate(&self, world: &World) -> ScriptResult<bool> {
        let value = world
            .lookup(&self.path)
            .map_err(|source| ScriptError::Reference {
                path: self.path.clone(),
                span: self.span.clone(),
                source,
            })?;
        Ok(match &self.comparison {
            None => value.is_truthy(),
            Some((op, rhs)) => op.apply(&value, rhs),
        })
    }
}

/// The first comparison operator in `text`: byte offset, operator, length.
fn find_operator(text: &str) -> Option<(usize, CompareOp, usize)> {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let eq_next = chars.peek().is_some_and(|&(_, n)| n == '=');
        let found = match (c, eq_next) {
            ('>', true) => (CompareOp::Ge, 2),
            ('>', false) => (CompareOp::Gt, 1),
            ('<', true) => (CompareOp::Le, 2),
            ('<', false) => (CompareOp::Lt, 1),
            ('!', true) => (CompareOp::Ne, 2),
            ('=', true) => (CompareOp::Eq, 2),
            ('=', false) => (CompareOp::Eq, 1),
            _ => continue,
        };
        return Some((i, found.0, found.1));
    }
    None
}

fn check_path(text: &str, span: Range<usize>) -> ScriptResult<()> {
    if text.chars().any(char::is_whitespace) {
        return Err(ScriptError::syntax(
            format!("malformed condition `{text}`"),
            span,
        ));
    }
    Path::parse(text)
        .map(|_| ())
        .map_err(|e| ScriptError::syntax(e.to_string(), span))
}

/// Right-hand literal: quoted text, else number, boolean, or raw text.
fn literal(raw: &str) -> Value {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Value::text(&raw[1..raw.len() - 1]);
        }
    }
    Value::parse_literal(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comparisons() {
        let atom = Atom::parse("count>=2", 0..8).unwrap();
        assert_eq!(atom.path, "count");
        assert_eq!(atom.comparison, Some((CompareOp::Ge, Value::Number(2.0))));

        let atom = Atom::parse("šálek-čaje:owner = kuchyně", 0..27).unwrap();
        assert_eq!(atom.path, "šálek-čaje:owner");
        assert_eq!(
            atom.comparison,
            Some((CompareOp::Eq, Value::text("kuchyně")))
        );

        let atom = Atom::parse("door == true", 0..12).unwrap();
        assert_eq!(atom.comparison, Some((CompareOp::Eq, Value::Bool(true))));
    }

    #[test]
    fn quoted_right_hand_side_is_text() {
        let atom = Atom::parse("name = \"Old Tom\"", 0..16).unwrap();
        assert_eq!(atom.comparison, Some((CompareOp::Eq, Value::text("Old Tom"))));
        let atom = Atom::parse("code = '42'", 0..11).unwrap();
        assert_eq!(atom.comparison, Some((CompareOp::Eq, Value::text("42"))));
    }

    #[test]
    fn bare_paths() {
        let atom = Atom::parse("klíče:visible", 0..14).unwrap();
        assert_eq!(atom.path, "klíče:visible");
        assert!(atom.comparison.is_none());
    }

    #[test]
    fn malformed_atoms() {
        assert!(matches!(
            Atom::parse("= 3", 0..3),
            Err(ScriptError::Syntax { .. })
        ));
        assert!(matches!(
            Atom::parse("count >", 0..7),
            Err(ScriptError::Syntax { .. })
        ));
        assert!(matches!(
            Atom::parse("two words", 0..9),
            Err(ScriptError::Syntax { .. })
        ));
        assert!(matches!(
            Atom::parse("item::owner = x", 0..15),
            Err(ScriptError::Syntax { .. })
        ));
    }

    #[test]
    fn mixed_type_comparisons() {
        assert!(CompareOp::Gt.apply(&Value::Number(3.0), &Value::Number(2.0)));
        assert!(CompareOp::Eq.apply(&Value::text("2"), &Value::Number(2.0)));
        assert!(!CompareOp::Gt.apply(&Value::text("abc"), &Value::Number(1.0)));
        assert!(CompareOp::Ne.apply(&Value::text("abc"), &Value::Number(1.0)));
        assert!(CompareOp::Le.apply(&Value::Number(2.0), &Value::Number(2.0)));
    }
}
