use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{Attributes, Value};

/// Id of the distinguished character that represents the player.
pub const PLAYER_ID: &str = "player";

/// The kind of an entity, in path-resolution search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A place the player can be in.
    Location,
    /// An object that can be owned, taken, and used.
    Item,
    /// A person, including the player.
    Character,
    /// A final narration selected when the story ends.
    Ending,
    /// A named global scalar.
    Variable,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location => write!(f, "location"),
            Self::Item => write!(f, "item"),
            Self::Character => write!(f, "character"),
            Self::Ending => write!(f, "ending"),
            Self::Variable => write!(f, "variable"),
        }
    }
}

/// One entry of an ordered description list.
///
/// An entry either carries a `default` text or a `condition` with the
/// `description` shown while it holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Base text shown regardless of conditions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Guard for `description`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Text appended to the base text while `condition` holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Description {
    /// A base text entry.
    pub fn base(text: impl Into<String>) -> Self {
        Self {
            default: Some(text.into()),
            ..Self::default()
        }
    }

    /// A conditional entry.
    pub fn when(condition: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            default: None,
            condition: Some(condition.into()),
            description: Some(text.into()),
        }
    }
}

/// An exit from a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Label the player uses to take this exit.
    pub direction: String,
    /// Target location id.
    pub target: String,
}

/// A `{condition?, description?, set?}` rule attached to an item event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectRule {
    /// Guard; the rule fires when absent or true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Narration emitted when the rule fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `;`-separated assignments applied when the rule fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
}

/// One entry of a character's `onTalk` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueEntry {
    /// Entry id. Only entries with an id can hold an active thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Guard checked while scanning for the entry to present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// What the character says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Assignments applied when the entry is presented.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    /// Player responses offered by this entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<Response>,
}

/// A player response to a dialogue entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Choice id, unique within its entry.
    pub id: String,
    /// What the player says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Guard; hidden and unselectable while false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Assignments applied when chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    /// Entry id presented after this response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// A place in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ordered description list.
    #[serde(default)]
    pub descriptions: Vec<Description>,
    /// Exits to other locations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<Connection>,
    /// Nested attribute tree.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

/// An object in the world. `owner` is the canonical placement attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// A location id, [`PLAYER_ID`], or nobody.
    pub owner: Option<String>,
    /// Whether the player can perceive the item.
    pub visible: bool,
    /// Whether the player can take the item.
    pub movable: bool,
    /// Ordered description list.
    pub descriptions: Vec<Description>,
    /// Rules run after the item is taken.
    pub on_take: Vec<EffectRule>,
    /// Rules run after the item is dropped.
    pub on_drop: Vec<EffectRule>,
    /// Rules scanned when the item is used; the first firing one applies.
    pub on_use: Vec<EffectRule>,
    /// Rules run after the item is examined.
    pub on_see: Vec<EffectRule>,
    /// Nested attribute tree.
    pub attributes: Attributes,
}

impl Item {
    /// Whether the player currently holds the item.
    pub fn is_held(&self) -> bool {
        self.owner.as_deref() == Some(PLAYER_ID)
    }

    /// Whether the item lies in the given location.
    pub fn is_at(&self, location: &str) -> bool {
        self.owner.as_deref() == Some(location)
    }
}

/// A person in the world. `location` is the canonical placement attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    /// Unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current location id.
    pub location: Option<String>,
    /// Whether the player can perceive the character.
    pub visible: bool,
    /// Ordered description list.
    pub descriptions: Vec<Description>,
    /// Dialogue entries scanned top to bottom.
    pub on_talk: Vec<DialogueEntry>,
    /// Nested attribute tree.
    pub attributes: Attributes,
}

impl Character {
    /// Find a dialogue entry by id.
    pub fn entry(&self, id: &str) -> Option<&DialogueEntry> {
        self.on_talk.iter().find(|e| e.id.as_deref() == Some(id))
    }
}

/// A named global scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Unique id.
    pub id: String,
    /// Current value.
    pub value: Value,
    /// Nested attribute tree.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl Variable {
    /// Create a variable with an empty attribute tree.
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
            attributes: Attributes::new(),
        }
    }
}

/// A final narration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ending {
    /// Unique id.
    pub id: String,
    /// Ordered description list.
    #[serde(default)]
    pub descriptions: Vec<Description>,
    /// Nested attribute tree.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

/// A borrowed entity of any kind.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    /// A location.
    Location(&'a Location),
    /// An item.
    Item(&'a Item),
    /// A character.
    Character(&'a Character),
    /// An ending.
    Ending(&'a Ending),
    /// A variable.
    Variable(&'a Variable),
}

impl<'a> EntityRef<'a> {
    /// The entity id.
    pub fn id(&self) -> &'a str {
        match self {
            Self::Location(e) => &e.id,
            Self::Item(e) => &e.id,
            Self::Character(e) => &e.id,
            Self::Ending(e) => &e.id,
            Self::Variable(e) => &e.id,
        }
    }

    /// The display name; endings and variables are named by their id.
    pub fn name(&self) -> &'a str {
        match self {
            Self::Location(e) => &e.name,
            Self::Item(e) => &e.name,
            Self::Character(e) => &e.name,
            Self::Ending(e) => &e.id,
            Self::Variable(e) => &e.id,
        }
    }

    /// The entity kind.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Location(_) => EntityKind::Location,
            Self::Item(_) => EntityKind::Item,
            Self::Character(_) => EntityKind::Character,
            Self::Ending(_) => EntityKind::Ending,
            Self::Variable(_) => EntityKind::Variable,
        }
    }

    /// The ordered description list; variables have none.
    pub fn descriptions(&self) -> &'a [Description] {
        match self {
            Self::Location(e) => &e.descriptions,
            Self::Item(e) => &e.descriptions,
            Self::Character(e) => &e.descriptions,
            Self::Ending(e) => &e.descriptions,
            Self::Variable(_) => &[],
        }
    }

    /// The entity's attribute tree.
    pub fn attributes(&self) -> &'a Attributes {
        match self {
            Self::Location(e) => &e.attributes,
            Self::Item(e) => &e.attributes,
            Self::Character(e) => &e.attributes,
            Self::Ending(e) => &e.attributes,
            Self::Variable(e) => &e.attributes,
        }
    }
}
