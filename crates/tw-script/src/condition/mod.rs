//! The boolean condition language.
//!
//! ```text
//! (šálek-čaje:owner = kuchyně && plný_šálek) || !plný_šálek
//! ```
//!
//! Atoms are combined with `&&` (binds tighter) and `||`, grouped with
//! parentheses, and negated with prefix `!`. A condition is compiled once into
//! a postfix program; evaluation reads the world and never mutates it.

/// Comparison atoms such as `count > 2`.
pub mod atom;
/// Tokenizer for conditions.
pub mod scanner;

use tw_core::World;

pub use atom::{Atom, CompareOp};

use crate::error::{ScriptError, ScriptResult};
use crate::rpn::{self, Infix, Operator, Postfix, Unbalanced};
use scanner::Token;

/// Logical operators of the condition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    /// `&&`
    And,
    /// `||`
    Or,
    /// Prefix `!`.
    Not,
}

impl Operator for Logic {
    fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Not => 3,
        }
    }

    fn arity(self) -> usize {
        match self {
            Self::Not => 1,
            Self::And | Self::Or => 2,
        }
    }

    fn is_right_assoc(self) -> bool {
        self == Self::Not
    }
}

/// A parsed condition, ready to evaluate against any world.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    program: Vec<Postfix<Atom, Logic>>,
}

impl Condition {
    /// Parse and statically check a condition.
    pub fn parse(source: &str) -> ScriptResult<Self> {
        let tokens = scanner::scan(source)?;
        if tokens.is_empty() {
            return Err(ScriptError::syntax("empty condition", 0..source.len()));
        }

        let infix = tokens
            .into_iter()
            .map(|t| {
                Ok(match t.token {
                    Token::Open => Infix::Open(t.span),
                    Token::Close => Infix::Close(t.span),
                    Token::And => Infix::Operator(Logic::And),
                    Token::Or => Infix::Operator(Logic::Or),
                    Token::Not => Infix::Operator(Logic::Not),
                    Token::Atom(text) => Infix::Operand(Atom::parse(&text, t.span)?),
                })
            })
            .collect::<ScriptResult<Vec<_>>>()?;

        let program = rpn::to_postfix(infix).map_err(|u| match u {
            Unbalanced::Open(span) => ScriptError::syntax("unclosed `(`", span),
            Unbalanced::Close(span) => ScriptError::syntax("unmatched `)`", span),
        })?;
        if !rpn::is_well_formed(&program) {
            return Err(ScriptError::syntax(
                "operator is missing an operand",
                0..source.len(),
            ));
        }

        Ok(Self {
            source: source.to_string(),
            program,
        })
    }

    /// Evaluate against the world. Every atom is resolved, so an unknown
    /// reference fails even where the result is already decided.
    pub fn evaluate(&self, world: &World) -> ScriptResult<bool> {
        rpn::evaluate(
            &self.program,
            |atom| atom.evaluate(world),
            |op, args| {
                Ok(match op {
                    Logic::Not => !args[0],
                    Logic::And => args[0] && args[1],
                    Logic::Or => args[0] || args[1],
                })
            },
            || ScriptError::evaluation(format!("malformed condition `{}`", self.source)),
        )
    }

    /// Every atom, in source order.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.program.iter().filter_map(|step| match step {
            Postfix::Operand(atom) => Some(atom),
            Postfix::Operator(_) => None,
        })
    }
}

/// Parse and evaluate in one step.
pub fn evaluate_condition(source: &str, world: &World) -> ScriptResult<bool> {
    Condition::parse(source)?.evaluate(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tw_core::{CoreError, Value};

    const WORLD: &str = r#"{
        "metadata": {"title": "Test"},
        "locations": [{"id": "kuchyně", "name": "Kuchyně"}],
        "items": [
            {"id": "šálek-čaje", "name": "Malý šálek čaje", "owner": "kuchyně"},
            {"id": "klíče", "name": "Klíče", "visible": "false"}
        ],
        "characters": [{"id": "player", "name": "Venda", "location": "kuchyně"}],
        "variables": [
            {"id": "plný_šálek", "value": "true"},
            {"id": "count", "value": 3}
        ]
    }"#;

    fn world() -> World {
        World::from_json(WORLD).unwrap()
    }

    fn eval(source: &str, world: &World) -> bool {
        evaluate_condition(source, world).unwrap()
    }

    #[test]
    fn compound_condition() {
        let mut w = world();
        let expr = "šálek-čaje:owner = kuchyně && plný_šálek";
        assert!(eval(expr, &w));
        w.set_value("plný_šálek", Value::Bool(false)).unwrap();
        assert!(!eval(expr, &w));
    }

    #[test]
    fn quoted_text_may_contain_operators() {
        let mut w = world();
        w.set_value("show", Value::text("Tom & Jerry")).unwrap();
        assert!(eval(r#"show = "Tom & Jerry" && count > 2"#, &w));
        assert!(!eval("show = 'Tom | Jerry'", &w));
    }

    #[test]
    fn grouped_negation() {
        let mut w = world();
        let expr = "(šálek-čaje:owner = kuchyně && plný_šálek) || !plný_šálek";
        assert!(eval(expr, &w));
        w.set_value("šálek-čaje:owner", Value::text("player")).unwrap();
        assert!(!eval(expr, &w));
        w.set_value("plný_šálek", Value::Bool(false)).unwrap();
        assert!(eval(expr, &w));
        assert!(!eval("!(plný_šálek || !plný_šálek)", &w));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let w = world();
        // false && true || true  ==  (false && true) || true
        assert!(eval("klíče:visible && plný_šálek || plný_šálek", &w));
        // true || true && false  ==  true || (true && false)
        assert!(eval("plný_šálek || plný_šálek && klíče:visible", &w));
    }

    #[test]
    fn comparisons_against_world() {
        let w = world();
        assert!(eval("count > 2", &w));
        assert!(eval("count>=3 && count<=3", &w));
        assert!(!eval("count != 3", &w));
        assert!(eval("count == 3", &w));
        assert!(eval("klíče:visible = false", &w));
        assert!(eval("player:location = kuchyně", &w));
    }

    #[test]
    fn unknown_references_fail() {
        let w = world();
        let err = evaluate_condition("unknown_variable", &w).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Reference { source: CoreError::UnknownPath(_), .. }
        ));
        assert!(matches!(
            evaluate_condition("šálek-čaje:unknown > 10", &w),
            Err(ScriptError::Reference { .. })
        ));
        // Evaluation is eager: the right side is resolved even though the
        // left side already decides the result.
        assert!(evaluate_condition("plný_šálek || missing", &w).is_err());
    }

    #[test]
    fn syntax_errors() {
        for source in ["", "(plný_šálek", "plný_šálek)", "plný_šálek &&", "!", "()", "a b"] {
            assert!(
                matches!(Condition::parse(source), Err(ScriptError::Syntax { .. })),
                "expected syntax error for {source:?}"
            );
        }
    }

    #[test]
    fn unclosed_paren_span_points_at_paren() {
        let err = Condition::parse("x && (y").unwrap_err();
        assert_eq!(err.span(), Some(5..6));
    }

    #[test]
    fn atoms_are_listed_in_order() {
        let c = Condition::parse("!a && (b:c > 1 || d)").unwrap();
        let paths: Vec<_> = c.atoms().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, ["a", "b:c", "d"]);
    }

    fn with_flags(a: bool, b: bool) -> World {
        let mut w = world();
        w.set_value("a", Value::Bool(a)).unwrap();
        w.set_value("b", Value::Bool(b)).unwrap();
        w
    }

    proptest! {
        #[test]
        fn negation_inverts(a in any::<bool>()) {
            let w = with_flags(a, false);
            prop_assert_eq!(eval("!a", &w), !eval("a", &w));
        }

        #[test]
        fn and_or_commute(a in any::<bool>(), b in any::<bool>()) {
            let w = with_flags(a, b);
            prop_assert_eq!(eval("a && b", &w), eval("b && a", &w));
            prop_assert_eq!(eval("a || b", &w), eval("b || a", &w));
        }

        #[test]
        fn false_b_satisfies_guarded_disjunction(a in any::<bool>()) {
            let w = with_flags(a, false);
            prop_assert!(eval("(a && b) || !b", &w));
        }
    }
}
