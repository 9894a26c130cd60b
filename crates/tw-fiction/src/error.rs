//! Error types for the fiction engine.
//!
//! Player mistakes (unknown names, unreachable items, refused options) are not
//! errors: they are narrated. What remains here is authoring or state damage
//! the caller has to see.

use thiserror::Error;
use tw_core::CoreError;
use tw_script::ScriptError;

/// Result type for fiction operations.
pub type FictionResult<T> = Result<T, FictionError>;

/// Errors that can occur while running a session.
#[derive(Debug, Error)]
pub enum FictionError {
    /// A condition or `set` statement in the document failed.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The world model rejected a read or write.
    #[error(transparent)]
    World(#[from] CoreError),

    /// The player has no location to act in.
    #[error("the player is not in any location")]
    PlayerNotPlaced,

    /// A saved game could not be read or written.
    #[error("saved game: {0}")]
    Save(#[from] serde_json::Error),
}
