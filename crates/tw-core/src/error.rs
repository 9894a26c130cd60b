/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when loading or addressing a world.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// Two entities share the same id.
    #[error("duplicate id: \"{0}\"")]
    DuplicateId(String),

    /// The document defines no character with id `player`.
    #[error("no player character defined")]
    MissingPlayer,

    /// A reference names an entity that does not exist.
    #[error("invalid reference from \"{from}\": \"{target}\" is not a known {expected}")]
    InvalidReference {
        /// The entity holding the reference.
        from: String,
        /// The unresolved target id.
        target: String,
        /// The kind of entity the reference should name.
        expected: &'static str,
    },

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),

    /// The document could not be parsed.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// A path string is not well formed.
    #[error("invalid path: \"{0}\"")]
    InvalidPath(String),

    /// The root entity of a path does not exist.
    #[error("unknown entity: \"{0}\"")]
    UnknownEntity(String),

    /// A path does not resolve to a variable or attribute.
    #[error("unknown path: \"{0}\"")]
    UnknownPath(String),

    /// A path resolves to a structured attribute where a scalar was expected.
    #[error("not a scalar value: \"{0}\"")]
    NotAScalar(String),

    /// A path tries to descend below a scalar.
    #[error("cannot descend into scalar at \"{0}\"")]
    NotAContainer(String),

    /// A path tries to write a read-only field.
    #[error("read-only field: \"{0}\"")]
    ReadOnly(String),
}
