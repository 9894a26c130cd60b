//! The assignment language: arithmetic expressions and `set` statements.
//!
//! ```text
//! counter = counter + 1; šálek-čaje:owner = kuchyně; greeting = "Hi " + name
//! ```
//!
//! A `-` joins an identifier only when a letter follows it, so `end-1` is a
//! subtraction. Ids like that must be quoted: `game_end_id = 'end-1'`.

/// Tokenizer for expressions.
pub mod scanner;
/// `set` statements made of `path = expression` clauses.
pub mod statement;

use std::ops::Range;

use tw_core::{CoreError, Value, World};

pub use statement::{Assignment, SetStatement, apply_set};

use crate::error::{ScriptError, ScriptResult};
use crate::rpn::{self, Infix, Operator, Postfix, Unbalanced};
use scanner::Token;

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arith {
    /// `+`, also text concatenation.
    Add,
    /// Binary `-`.
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// Unary minus.
    Neg,
}

impl Operator for Arith {
    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div | Self::Rem => 2,
            Self::Neg => 3,
        }
    }

    fn arity(self) -> usize {
        if self == Self::Neg { 1 } else { 2 }
    }

    fn is_right_assoc(self) -> bool {
        self == Self::Neg
    }
}

/// An operand in a compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A number, string, or boolean written in the source.
    Literal(Value),
    /// A variable id or path, read when evaluated.
    Ident {
        /// The path as written.
        path: String,
        /// Where in the source.
        span: Range<usize>,
    },
}

/// A compiled arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    program: Vec<Postfix<Operand, Arith>>,
}

impl Expression {
    /// Parse an expression. Unbalanced parentheses and missing operands are
    /// evaluation errors; unknown characters are syntax errors.
    pub fn parse(source: &str) -> ScriptResult<Self> {
        match source.trim() {
            "true" => return Ok(Self::literal(Value::Bool(true))),
            "false" => return Ok(Self::literal(Value::Bool(false))),
            _ => {}
        }

        let tokens = scanner::scan(source)?;
        if tokens.is_empty() {
            return Err(ScriptError::syntax("empty expression", 0..source.len()));
        }

        let mut infix = Vec::with_capacity(tokens.len());
        let mut prev: Option<Token> = None;
        for t in tokens {
            let unary = !prev.as_ref().is_some_and(Token::ends_operand);
            infix.push(match &t.token {
                Token::Number(n) => Infix::Operand(Operand::Literal(Value::Number(*n))),
                Token::Str(s) => Infix::Operand(Operand::Literal(Value::text(s.clone()))),
                Token::Bool(b) => Infix::Operand(Operand::Literal(Value::Bool(*b))),
                Token::Ident(path) => Infix::Operand(Operand::Ident {
                    path: path.clone(),
                    span: t.span.clone(),
                }),
                Token::Minus if unary => Infix::Operator(Arith::Neg),
                Token::Minus => Infix::Operator(Arith::Sub),
                Token::Plus => Infix::Operator(Arith::Add),
                Token::Star => Infix::Operator(Arith::Mul),
                Token::Slash => Infix::Operator(Arith::Div),
                Token::Percent => Infix::Operator(Arith::Rem),
                Token::Open => Infix::Open(t.span.clone()),
                Token::Close => Infix::Close(t.span.clone()),
            });
            prev = Some(t.token);
        }

        let program = rpn::to_postfix(infix).map_err(|u| match u {
            Unbalanced::Open(_) => ScriptError::evaluation("unclosed `(`"),
            Unbalanced::Close(_) => ScriptError::evaluation("unmatched `)`"),
        })?;
        if !rpn::is_well_formed(&program) {
            return Err(ScriptError::evaluation(format!(
                "operator is missing an operand in `{}`",
                source.trim()
            )));
        }
        Ok(Self { program })
    }

    fn literal(value: Value) -> Self {
        Self {
            program: vec![Postfix::Operand(Operand::Literal(value))],
        }
    }

    /// Whether the expression is a single identifier, which reads as its own
    /// text when it does not resolve.
    pub fn is_bare_identifier(&self) -> bool {
        matches!(self.program.as_slice(), [Postfix::Operand(Operand::Ident { .. })])
    }

    /// Shift identifier spans by `by` bytes, for expressions parsed out of a
    /// larger source.
    pub(crate) fn offset(mut self, by: usize) -> Self {
        for step in &mut self.program {
            if let Postfix::Operand(Operand::Ident { span, .. }) = step {
                *span = span.start + by..span.end + by;
            }
        }
        self
    }

    /// Evaluate against the world.
    ///
    /// An identifier that does not resolve reads as its own text when it is
    /// the whole expression, and as 0 anywhere else.
    pub fn evaluate(&self, world: &World) -> ScriptResult<Value> {
        let lone = self.is_bare_identifier();
        rpn::evaluate(
            &self.program,
            |operand| match operand {
                Operand::Literal(v) => Ok(v.clone()),
                Operand::Ident { path, span } => match world.lookup(path) {
                    Ok(v) => Ok(v),
                    Err(CoreError::UnknownPath(_)) if lone => Ok(Value::text(path.clone())),
                    Err(CoreError::UnknownPath(_)) => Ok(Value::Number(0.0)),
                    Err(source) => Err(ScriptError::Reference {
                        path: path.clone(),
                        span: span.clone(),
                        source,
                    }),
                },
            },
            apply,
            || ScriptError::evaluation("operand stack underflow"),
        )
    }

    /// Identifiers referenced by the expression, in source order.
    pub fn identifiers(&self) -> impl Iterator<Item = (&str, &Range<usize>)> {
        self.program.iter().filter_map(|step| match step {
            Postfix::Operand(Operand::Ident { path, span }) => Some((path.as_str(), span)),
            _ => None,
        })
    }
}

fn number(value: &Value) -> ScriptResult<f64> {
    value
        .to_number()
        .ok_or_else(|| ScriptError::evaluation(format!("`{value}` is not a number")))
}

fn apply(op: Arith, args: Vec<Value>) -> ScriptResult<Value> {
    if op == Arith::Neg {
        return Ok(Value::Number(-number(&args[0])?));
    }
    let (left, right) = (&args[0], &args[1]);
    if op == Arith::Add && (matches!(left, Value::Text(_)) || matches!(right, Value::Text(_))) {
        return Ok(Value::Text(format!("{left}{right}")));
    }
    let (a, b) = (number(left)?, number(right)?);
    let result = match op {
        Arith::Add => a + b,
        Arith::Sub => a - b,
        Arith::Mul => a * b,
        Arith::Div | Arith::Rem if b == 0.0 => {
            return Err(ScriptError::evaluation("division by zero"));
        }
        Arith::Div => a / b,
        Arith::Rem => a % b,
        Arith::Neg => -a,
    };
    Ok(Value::Number(result))
}
