use std::ops::Range;

use tw_core::{Path, World};

use super::Expression;
use crate::error::{ScriptError, ScriptResult};

/// One `path = expression` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Target path.
    pub target: String,
    /// Right-hand side.
    pub expression: Expression,
    /// Byte range of the clause in the statement source.
    pub span: Range<usize>,
}

/// A parsed `set` statement: `;`-separated assignments applied left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct SetStatement {
    clauses: Vec<Assignment>,
}

impl SetStatement {
    /// Parse a statement. Separators inside quoted strings are ignored.
    pub fn parse(source: &str) -> ScriptResult<Self> {
        let mut clauses = Vec::new();
        for (start, end) in split_outside_quotes(source, ';') {
            let raw = &source[start..end];
            let trimmed = raw.trim_start();
            let offset = start + (raw.len() - trimmed.len());
            let clause = trimmed.trim_end();
            if clause.is_empty() {
                continue;
            }
            clauses.push(parse_clause(clause, offset)?);
        }
        Ok(Self { clauses })
    }

    /// The clauses in order.
    pub fn clauses(&self) -> &[Assignment] {
        &self.clauses
    }

    /// Evaluate and write each clause in turn, so later clauses see the
    /// values written by earlier ones. Stops at the first failure.
    pub fn apply(&self, world: &mut World) -> ScriptResult<()> {
        for clause in &self.clauses {
            let value = clause.expression.evaluate(world)?;
            world.set_value(&clause.target, value)?;
        }
        Ok(())
    }
}

/// Parse and apply a statement in one step.
pub fn apply_set(source: &str, world: &mut World) -> ScriptResult<()> {
    SetStatement::parse(source)?.apply(world)
}

fn parse_clause(clause: &str, offset: usize) -> ScriptResult<Assignment> {
    let span = offset..offset + clause.len();
    let Some(&eq) = separators(clause, '=').first() else {
        return Err(ScriptError::syntax(
            format!("expected `path = expression`, found `{clause}`"),
            span,
        ));
    };

    let target = clause[..eq].trim();
    let target_span = offset..offset + eq;
    if target.is_empty() || target.chars().any(char::is_whitespace) {
        return Err(ScriptError::syntax(
            format!("malformed assignment target `{target}`"),
            target_span,
        ));
    }
    Path::parse(target).map_err(|e| ScriptError::syntax(e.to_string(), target_span))?;

    let rhs_start = eq + 1;
    let expression = Expression::parse(&clause[rhs_start..])
        .map_err(|e| e.offset(offset + rhs_start))?
        .offset(offset + rhs_start);

    Ok(Assignment {
        target: target.to_string(),
        expression,
        span,
    })
}

/// Byte offsets of every `sep` that is not inside a quoted string.
fn separators(source: &str, sep: char) -> Vec<usize> {
    let mut found = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in source.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == sep => found.push(i),
            None => {}
        }
    }
    found
}

/// Byte ranges of the pieces of `source` between unquoted `sep` characters.
fn split_outside_quotes(source: &str, sep: char) -> Vec<(usize, usize)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for at in separators(source, sep) {
        pieces.push((start, at));
        start = at + sep.len_utf8();
    }
    pieces.push((start, source.len()));
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tw_core::Value;

    fn world() -> World {
        World::from_json(
            r#"{
                "locations": [{"id": "kuchyně", "name": "Kuchyně"}],
                "items": [{"id": "šálek-čaje", "name": "Šálek", "owner": "player"}],
                "characters": [{"id": "player", "name": "Venda", "location": "kuchyně"}],
                "variables": [
                    {"id": "plný_šálek", "value": "false"},
                    {"id": "counter", "value": 1}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn applies_clauses_in_order() {
        let mut w = world();
        apply_set(
            "šálek-čaje:visible = true; šálek-čaje:owner = kuchyně; plný_šálek = true",
            &mut w,
        )
        .unwrap();
        let cup = w.item("šálek-čaje").unwrap();
        assert!(cup.visible);
        assert!(cup.is_at("kuchyně"));
        assert_eq!(w.lookup("plný_šálek").unwrap(), Value::Bool(true));
    }

    #[test]
    fn counter_arithmetic() {
        let mut w = world();
        apply_set("counter = counter + 1", &mut w).unwrap();
        assert_eq!(w.lookup("counter").unwrap(), Value::Number(2.0));
        apply_set("counter = counter - 1", &mut w).unwrap();
        assert_eq!(w.lookup("counter").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn later_clauses_see_earlier_writes() {
        let mut w = world();
        apply_set("a = 2; b = a * 10; a = a + b", &mut w).unwrap();
        assert_eq!(w.lookup("b").unwrap(), Value::Number(20.0));
        assert_eq!(w.lookup("a").unwrap(), Value::Number(22.0));
    }

    #[test]
    fn nested_counter_materializes() {
        let mut w = world();
        apply_set("šálek-čaje:onSee:count = šálek-čaje:onSee:count + 1", &mut w).unwrap();
        apply_set("šálek-čaje:onSee:count = šálek-čaje:onSee:count + 1", &mut w).unwrap();
        assert_eq!(w.lookup("šálek-čaje:onSee:count").unwrap(), Value::Number(2.0));
    }

    #[test]
    fn separators_inside_quotes() {
        let mut w = world();
        apply_set(r#"note = "a; b = c"; other = 'x'"#, &mut w).unwrap();
        assert_eq!(w.lookup("note").unwrap(), Value::text("a; b = c"));
        assert_eq!(w.lookup("other").unwrap(), Value::text("x"));
    }

    #[test]
    fn empty_clauses_are_skipped() {
        let stmt = SetStatement::parse(" ; counter = 3 ;; ").unwrap();
        assert_eq!(stmt.clauses().len(), 1);
        assert_eq!(stmt.clauses()[0].target, "counter");
    }

    #[test]
    fn malformed_clauses() {
        assert!(matches!(
            SetStatement::parse("counter"),
            Err(ScriptError::Syntax { .. })
        ));
        assert!(matches!(
            SetStatement::parse("= 3"),
            Err(ScriptError::Syntax { .. })
        ));
        assert!(matches!(
            SetStatement::parse("two words = 3"),
            Err(ScriptError::Syntax { .. })
        ));
    }

    #[test]
    fn expression_spans_are_relative_to_statement() {
        let source = "a = 1; b = 2 $ 3";
        let err = SetStatement::parse(source).unwrap_err();
        let span = err.span().unwrap();
        assert_eq!(&source[span], "$");
    }

    #[test]
    fn identifier_spans_are_relative_to_statement() {
        let source = "a = 1; b = end-1";
        let statement = SetStatement::parse(source).unwrap();
        let (path, span) = statement.clauses()[1].expression.identifiers().next().unwrap();
        assert_eq!(path, "end");
        assert_eq!(&source[span.clone()], "end");
        assert!(!statement.clauses()[1].expression.is_bare_identifier());
    }

    #[test]
    fn unknown_root_is_a_world_error() {
        let mut w = world();
        let err = apply_set("sklep:light = true", &mut w).unwrap_err();
        assert!(matches!(err, ScriptError::World(_)));
    }

    proptest! {
        #[test]
        fn increment_then_decrement_restores(start in -1000i64..1000) {
            let mut w = world();
            w.set_value("counter", Value::from(start)).unwrap();
            apply_set("counter = counter + 1", &mut w).unwrap();
            prop_assert_eq!(w.lookup("counter").unwrap(), Value::from(start + 1));
            apply_set("counter = counter - 1", &mut w).unwrap();
            prop_assert_eq!(w.lookup("counter").unwrap(), Value::from(start));
        }
    }
}
