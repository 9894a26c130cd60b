//! Script error types.

use std::ops::Range;

use tw_core::CoreError;

/// Result type alias for script parsing and evaluation.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors raised by the condition and assignment languages.
///
/// None of these are fatal to a running session: the caller reports them and
/// carries on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptError {
    /// The source text is malformed.
    #[error("syntax error: {message}")]
    Syntax {
        /// What is wrong.
        message: String,
        /// Where in the source.
        span: Range<usize>,
    },

    /// A condition read a path the world cannot resolve.
    #[error("cannot resolve `{path}`: {source}")]
    Reference {
        /// The path as written.
        path: String,
        /// Where in the source.
        span: Range<usize>,
        /// Why the world refused it.
        source: CoreError,
    },

    /// A well-formed expression could not be computed.
    #[error("evaluation error: {message}")]
    Evaluation {
        /// What went wrong, e.g. division by zero.
        message: String,
    },

    /// A `set` write the world rejected.
    #[error(transparent)]
    World(#[from] CoreError),
}

impl ScriptError {
    pub(crate) fn syntax(message: impl Into<String>, span: Range<usize>) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// The offending byte range in the source, when known.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            Self::Syntax { span, .. } | Self::Reference { span, .. } => Some(span.clone()),
            Self::Evaluation { .. } | Self::World(_) => None,
        }
    }

    /// Shift the span by `offset` bytes, for errors found in a sub-slice.
    pub(crate) fn offset(self, offset: usize) -> Self {
        let shift = |span: Range<usize>| span.start + offset..span.end + offset;
        match self {
            Self::Syntax { message, span } => Self::Syntax {
                message,
                span: shift(span),
            },
            Self::Reference { path, span, source } => Self::Reference {
                path,
                span: shift(span),
                source,
            },
            other => other,
        }
    }
}
