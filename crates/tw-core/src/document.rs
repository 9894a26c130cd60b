//! The authored world document.
//!
//! A [`Document`] is the as-authored shape of a world: flags may be written
//! as strings, owners may be missing. [`crate::World::load`] is the only
//! consumer, and it normalizes everything exactly once. A normalized world
//! converts back into a document through [`crate::World::snapshot`].

use serde::{Deserialize, Serialize};

use crate::entity::{
    Character, DialogueEntry, Description, EffectRule, Ending, Item, Location, Variable,
};
use crate::error::{CoreError, CoreResult};
use crate::value::{Attributes, Value};

/// Title and authoring metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Story title (may contain HTML).
    #[serde(default)]
    pub title: String,
    /// Author name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Document version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Short blurb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Language tag of the narration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// One page of the intro shown when a session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroPage {
    /// Page text (HTML fragment).
    pub page: String,
}

/// An item as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDef {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// A location id, `"player"`, or absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// As-authored visibility flag; absent means visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<Value>,
    /// As-authored movability flag; absent means movable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movable: Option<Value>,
    /// Ordered description list.
    #[serde(default)]
    pub descriptions: Vec<Description>,
    /// Rules run after taking.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_take: Vec<EffectRule>,
    /// Rules run after dropping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_drop: Vec<EffectRule>,
    /// Rules scanned on use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_use: Vec<EffectRule>,
    /// Rules run after examining.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_see: Vec<EffectRule>,
    /// Nested attribute tree.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

/// A character as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDef {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Location id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// As-authored visibility flag; absent means visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<Value>,
    /// Ordered description list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<Description>,
    /// Dialogue entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_talk: Vec<DialogueEntry>,
    /// Nested attribute tree.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

/// The complete authored world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Title and authoring metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Intro pages shown at session start.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intro: Vec<IntroPage>,
    /// All locations, in authored order.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// All items, in authored order.
    #[serde(default)]
    pub items: Vec<ItemDef>,
    /// All characters, in authored order.
    #[serde(default)]
    pub characters: Vec<CharacterDef>,
    /// All endings, in authored order.
    #[serde(default)]
    pub endings: Vec<Ending>,
    /// All variables, in authored order.
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Document {
    /// Parse a document from JSON text.
    pub fn from_json(source: &str) -> CoreResult<Self> {
        serde_json::from_str(source).map_err(|e| CoreError::Malformed(e.to_string()))
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::Malformed(e.to_string()))
    }

    /// Ids of every entity in search order, with duplicates preserved.
    pub fn all_ids(&self) -> impl Iterator<Item = &str> {
        self.locations
            .iter()
            .map(|e| e.id.as_str())
            .chain(self.items.iter().map(|e| e.id.as_str()))
            .chain(self.characters.iter().map(|e| e.id.as_str()))
            .chain(self.endings.iter().map(|e| e.id.as_str()))
            .chain(self.variables.iter().map(|e| e.id.as_str()))
    }
}

/// Coerce an as-authored flag. Absent means `true`; text counts only when it
/// is exactly `"true"`.
pub(crate) fn normalize_flag(flag: Option<&Value>) -> bool {
    match flag {
        None => true,
        Some(Value::Bool(b)) => *b,
        Some(Value::Text(s)) => s.trim() == "true",
        Some(n @ Value::Number(_)) => n.is_truthy(),
    }
}

/// Coerce textual booleans in a variable value.
pub(crate) fn normalize_variable_value(value: Value) -> Value {
    match value {
        Value::Text(s) if s == "true" => Value::Bool(true),
        Value::Text(s) if s == "false" => Value::Bool(false),
        other => other,
    }
}

impl ItemDef {
    pub(crate) fn normalize(self) -> Item {
        Item {
            id: self.id,
            name: self.name,
            owner: self.owner.filter(|o| !o.is_empty()),
            visible: normalize_flag(self.visible.as_ref()),
            movable: normalize_flag(self.movable.as_ref()),
            descriptions: self.descriptions,
            on_take: self.on_take,
            on_drop: self.on_drop,
            on_use: self.on_use,
            on_see: self.on_see,
            attributes: self.attributes,
        }
    }
}

impl From<&Item> for ItemDef {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            owner: item.owner.clone(),
            visible: Some(Value::Bool(item.visible)),
            movable: Some(Value::Bool(item.movable)),
            descriptions: item.descriptions.clone(),
            on_take: item.on_take.clone(),
            on_drop: item.on_drop.clone(),
            on_use: item.on_use.clone(),
            on_see: item.on_see.clone(),
            attributes: item.attributes.clone(),
        }
    }
}

impl CharacterDef {
    pub(crate) fn normalize(self) -> Character {
        Character {
            id: self.id,
            name: self.name,
            location: self.location.filter(|l| !l.is_empty()),
            visible: normalize_flag(self.visible.as_ref()),
            descriptions: self.descriptions,
            on_talk: self.on_talk,
            attributes: self.attributes,
        }
    }
}

impl From<&Character> for CharacterDef {
    fn from(character: &Character) -> Self {
        Self {
            id: character.id.clone(),
            name: character.name.clone(),
            location: character.location.clone(),
            visible: Some(Value::Bool(character.visible)),
            descriptions: character.descriptions.clone(),
            on_talk: character.on_talk.clone(),
            attributes: character.attributes.clone(),
        }
    }
}
