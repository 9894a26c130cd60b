//! The two small languages authors write world rules in.
//!
//! - [`condition`]: boolean guards such as `count > 2 && !door:locked`.
//! - [`assign`]: `set` statements such as `counter = counter + 1; lit = true`.
//!
//! Both are scanned character by character, reordered with the shared
//! shunting-yard in [`rpn`], and evaluated with an operand stack.

pub mod assign;
pub mod condition;
/// Labelled reports for script errors and warnings.
pub mod diagnostics;
pub mod error;
pub mod rpn;

pub use assign::{Assignment, Expression, SetStatement, apply_set};
pub use condition::{Condition, evaluate_condition};
pub use diagnostics::{Diagnostic, Severity, render, render_diagnostics};
pub use error::{ScriptError, ScriptResult};
