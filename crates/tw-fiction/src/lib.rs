//! Interactive fiction engine for Talewright.
//!
//! Runs a loaded [`tw_core::World`]: players issue [`Action`]s, the
//! [`FictionSession`] resolves their consequences through the condition and
//! assignment languages of `tw_script`, and answers with [`Output`] events
//! that either replace a named section of the page or append to the
//! scrollback.

/// Player action events and name resolution.
pub mod action;
/// Engine configuration and narration strings.
pub mod config;
/// Per-character dialogue threads.
pub mod dialogue;
/// Effect rules attached to item events.
pub mod effects;
/// Error types for the fiction engine.
pub mod error;
/// Description resolution and affordance sections.
pub mod narrator;
/// Output events and HTML fragments.
pub mod output;
/// The action dispatcher.
pub mod session;

pub use action::{Action, ChoicePayload, Param, Verb};
pub use config::{EngineConfig, Messages};
pub use dialogue::{DialogueEngine, DialogueState};
pub use error::{FictionError, FictionResult};
pub use output::{Output, SCROLLBACK, Section};
pub use session::{FictionSession, SavedGame};
