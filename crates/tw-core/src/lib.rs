//! Core types for Talewright: values, world documents, and the world model.
//!
//! A story world is authored as a [`Document`] and turned into a [`World`]
//! exactly once through [`World::load`], which validates ids and normalizes
//! as-authored values. From then on every mutation goes through
//! [`World::set_value`], addressed by colon-delimited [`Path`]s.

/// Error types used throughout the crate.
pub mod error;
/// Entity types held by the world model.
pub mod entity;
/// The authored world document and its serde representation.
pub mod document;
/// Colon-delimited paths into the world model.
pub mod path;
/// Scalar values and the nested attribute tree.
pub mod value;
/// The central world model that owns every entity.
pub mod world;

/// Re-export entity types.
pub use entity::{
    Character, Connection, Description, DialogueEntry, EffectRule, Ending, EntityKind, EntityRef,
    Item, Location, PLAYER_ID, Response, Variable,
};
/// Re-export document types.
pub use document::{CharacterDef, Document, IntroPage, ItemDef, Metadata};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export path type.
pub use path::Path;
/// Re-export value types.
pub use value::{Attribute, Attributes, Value};
/// Re-export world model type.
pub use world::World;
