//! Engine configuration.
//!
//! Every field has a default, so a partial JSON override is enough:
//!
//! ```json
//! { "endFlag": "finished", "messages": { "nothingHappens": "Nic se nestalo." } }
//! ```

use serde::{Deserialize, Serialize};

/// Player-facing narration for refused or empty actions.
///
/// `{name}` in a template is replaced with the thing the player named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    /// No connection matches the requested direction.
    pub cannot_go: String,
    /// Nothing by that name can be perceived.
    pub not_found: String,
    /// The thing exists but is somewhere else.
    pub not_here: String,
    /// Taking something already held.
    pub already_held: String,
    /// Taking something immovable.
    pub cannot_take: String,
    /// Dropping something not held.
    pub not_held: String,
    /// Using something without use rules.
    pub cannot_use: String,
    /// No use rule fired.
    pub nothing_happens: String,
    /// No dialogue entry matched.
    pub cannot_talk: String,
    /// A dialogue choice that cannot be picked.
    pub not_available: String,
    /// An unrecognized verb.
    pub unknown_command: String,
    /// Suggestion appended to a failed lookup.
    pub did_you_mean: String,
    /// Taking something without take rules.
    pub taken: String,
    /// Dropping something without drop rules.
    pub dropped: String,
    /// Held items; `{name}` is the comma-separated list.
    pub inventory: String,
    /// Nothing held.
    pub inventory_empty: String,
    /// Closing line when no ending is named.
    pub the_end: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            cannot_go: "You cannot go there.".to_string(),
            not_found: "There is no {name} here.".to_string(),
            not_here: "{name} is not here.".to_string(),
            already_held: "You already have {name}.".to_string(),
            cannot_take: "You cannot take {name}.".to_string(),
            not_held: "You are not carrying {name}.".to_string(),
            cannot_use: "You cannot use {name}.".to_string(),
            nothing_happens: "Nothing happens.".to_string(),
            cannot_talk: "{name} has nothing to say.".to_string(),
            not_available: "That option is not available.".to_string(),
            unknown_command: "Unknown command: {name}.".to_string(),
            did_you_mean: "Did you mean {name}?".to_string(),
            taken: "You take {name}.".to_string(),
            dropped: "You drop {name}.".to_string(),
            inventory: "You are carrying: {name}.".to_string(),
            inventory_empty: "You are not carrying anything.".to_string(),
            the_end: "The End.".to_string(),
        }
    }
}

impl Messages {
    /// Fill the `{name}` placeholder of a template.
    pub fn format(template: &str, name: &str) -> String {
        template.replace("{name}", name)
    }
}

/// Configuration for a fiction session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Variable that ends the game when truthy.
    pub end_flag: String,
    /// Variable naming the ending to narrate.
    pub end_id: String,
    /// Suffix of the per-section visibility variables (`game-items-show`).
    pub show_suffix: String,
    /// Narration strings.
    pub messages: Messages,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            end_flag: "game_end".to_string(),
            end_id: "game_end_id".to_string(),
            show_suffix: "-show".to_string(),
            messages: Messages::default(),
        }
    }
}

impl EngineConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON override.
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    /// Set the end-of-game flag variable.
    pub fn with_end_flag(mut self, name: impl Into<String>) -> Self {
        self.end_flag = name.into();
        self
    }

    /// Set the ending id variable.
    pub fn with_end_id(mut self, name: impl Into<String>) -> Self {
        self.end_id = name.into();
        self
    }

    /// Set the section visibility suffix.
    pub fn with_show_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.show_suffix = suffix.into();
        self
    }

    /// Replace the narration strings.
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }
}
