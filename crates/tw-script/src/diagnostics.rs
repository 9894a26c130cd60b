//! Script diagnostics rendered with ariadne.

use std::fmt;
use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use crate::error::ScriptError;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The script cannot run.
    Error,
    /// The script runs but probably not as intended.
    Warning,
}

/// A diagnostic message with a byte range into a script source.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// How serious it is.
    pub severity: Severity,
    /// Byte range the report points at.
    pub span: Range<usize>,
    /// Headline message.
    pub message: String,
    /// Text attached to the span, defaulting to the message.
    pub label: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// Attach a label to the span.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Build an error diagnostic for a script failure in `source`. Errors
    /// without a span cover the whole source.
    pub fn from_script_error(source: &str, error: &ScriptError) -> Self {
        let span = error.span().unwrap_or(0..source.len());
        let label = match error {
            ScriptError::Syntax { .. } => "not understood here",
            ScriptError::Reference { .. } => "does not resolve",
            ScriptError::Evaluation { .. } => "cannot be evaluated",
            ScriptError::World(_) => "cannot be written",
        };
        Self::error(span, error.to_string()).with_label(label)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: {}", self.message)
    }
}

/// Render diagnostics with ariadne. Spans are byte offsets.
pub fn render_diagnostics(source: &str, name: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = Vec::new();

    for diag in diagnostics {
        let (kind, color) = match diag.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        let label_text = diag.label.as_deref().unwrap_or(&diag.message);
        Report::build(kind, (name, diag.span.clone()))
            .with_config(
                Config::default()
                    .with_index_type(IndexType::Byte)
                    .with_color(false),
            )
            .with_message(&diag.message)
            .with_label(
                Label::new((name, diag.span.clone()))
                    .with_message(label_text)
                    .with_color(color),
            )
            .finish()
            .write((name, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

/// Render a single script error.
pub fn render(source: &str, name: &str, error: &ScriptError) -> String {
    render_diagnostics(source, name, &[Diagnostic::from_script_error(source, error)])
}
