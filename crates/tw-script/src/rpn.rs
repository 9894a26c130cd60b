//! Infix to postfix conversion and postfix evaluation, shared by both
//! script languages.
//!
//! Each language supplies its own operand type and an [`Operator`] enum; the
//! shunting-yard pass and the operand-stack evaluator are the same.

use std::ops::Range;

/// An operator in an infix stream.
pub trait Operator: Copy {
    /// Binding strength; higher binds tighter.
    fn precedence(self) -> u8;

    /// Number of operands consumed.
    fn arity(self) -> usize;

    /// Prefix operators are right-associative.
    fn is_right_assoc(self) -> bool {
        false
    }
}

/// One token of an infix stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Infix<A, O> {
    /// A value the operators consume.
    Operand(A),
    /// An operator, prefix or binary.
    Operator(O),
    /// `(` at the given source range.
    Open(Range<usize>),
    /// `)` at the given source range.
    Close(Range<usize>),
}

/// One step of a postfix program.
#[derive(Debug, Clone, PartialEq)]
pub enum Postfix<A, O> {
    /// Push an operand.
    Operand(A),
    /// Pop the operator's operands and push its result.
    Operator(O),
}

/// A parenthesis without a partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unbalanced {
    /// An `(` that is never closed.
    Open(Range<usize>),
    /// A `)` with nothing to close.
    Close(Range<usize>),
}

enum Pending<O> {
    Op(O),
    Open(Range<usize>),
}

/// Shunting-yard: reorder an infix stream into postfix.
pub fn to_postfix<A, O: Operator>(
    tokens: impl IntoIterator<Item = Infix<A, O>>,
) -> Result<Vec<Postfix<A, O>>, Unbalanced> {
    let mut output = Vec::new();
    let mut stack: Vec<Pending<O>> = Vec::new();

    for token in tokens {
        match token {
            Infix::Operand(a) => output.push(Postfix::Operand(a)),
            Infix::Operator(op) => {
                while let Some(Pending::Op(top)) = stack.last() {
                    let top = *top;
                    let pops = top.precedence() > op.precedence()
                        || (top.precedence() == op.precedence() && !op.is_right_assoc());
                    if !pops {
                        break;
                    }
                    stack.pop();
                    output.push(Postfix::Operator(top));
                }
                stack.push(Pending::Op(op));
            }
            Infix::Open(span) => stack.push(Pending::Open(span)),
            Infix::Close(span) => loop {
                match stack.pop() {
                    Some(Pending::Op(op)) => output.push(Postfix::Operator(op)),
                    Some(Pending::Open(_)) => break,
                    None => return Err(Unbalanced::Close(span)),
                }
            },
        }
    }

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Op(op) => output.push(Postfix::Operator(op)),
            Pending::Open(span) => return Err(Unbalanced::Open(span)),
        }
    }
    Ok(output)
}

/// Check that a program leaves exactly one value on the stack without ever
/// underflowing.
pub fn is_well_formed<A, O: Operator>(program: &[Postfix<A, O>]) -> bool {
    let mut depth = 0usize;
    for step in program {
        match step {
            Postfix::Operand(_) => depth += 1,
            Postfix::Operator(op) => {
                let n = op.arity();
                if depth < n {
                    return false;
                }
                depth = depth - n + 1;
            }
        }
    }
    depth == 1
}

/// Run a postfix program with an operand stack. Every operand is resolved,
/// in order, regardless of the operators around it.
pub fn evaluate<A, O: Operator, V, E>(
    program: &[Postfix<A, O>],
    mut operand: impl FnMut(&A) -> Result<V, E>,
    mut apply: impl FnMut(O, Vec<V>) -> Result<V, E>,
    underflow: impl Fn() -> E,
) -> Result<V, E> {
    let mut stack = Vec::new();
    for step in program {
        match step {
            Postfix::Operand(a) => stack.push(operand(a)?),
            Postfix::Operator(op) => {
                let n = op.arity();
                if stack.len() < n {
                    return Err(underflow());
                }
                let args = stack.split_off(stack.len() - n);
                stack.push(apply(*op, args)?);
            }
        }
    }
    match (stack.pop(), stack.is_empty()) {
        (Some(value), true) => Ok(value),
        _ => Err(underflow()),
    }
}
