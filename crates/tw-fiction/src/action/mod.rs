//! Player action events.
//!
//! On the wire an action is `{"verb": "...", "param": ...}` where `param` is
//! either plain text or a dialogue choice payload. Typed input goes through
//! [`Action::parse`], which splits a command line into verb and parameter.

pub mod resolver;

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the player wants to do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verb {
    /// Show the title and intro, then look around.
    Start,
    /// Describe the current location.
    Look,
    /// Follow a connection.
    Go,
    /// Examine an item or character.
    See,
    /// Pick up an item.
    Take,
    /// Put down a held item.
    Drop,
    /// Use an item.
    Use,
    /// Talk to a character.
    Talk,
    /// Pick a dialogue response.
    DialogChoice,
    /// List held items.
    Inventory,
    /// Anything else, kept as typed.
    Unknown(String),
}

impl Verb {
    /// Parse a verb, accepting common aliases.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "start" => Self::Start,
            "look" | "l" => Self::Look,
            "go" | "walk" | "move" => Self::Go,
            "see" | "examine" | "x" => Self::See,
            "take" | "get" | "pick" => Self::Take,
            "drop" | "put" => Self::Drop,
            "use" => Self::Use,
            "talk" | "speak" => Self::Talk,
            "dialog-choice" | "choose" => Self::DialogChoice,
            "inventory" | "inv" | "i" => Self::Inventory,
            _ => Self::Unknown(input.trim().to_string()),
        }
    }

    /// The canonical wire name.
    pub fn name(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::Look => "look",
            Self::Go => "go",
            Self::See => "see",
            Self::Take => "take",
            Self::Drop => "drop",
            Self::Use => "use",
            Self::Talk => "talk",
            Self::DialogChoice => "dialog-choice",
            Self::Inventory => "inventory",
            Self::Unknown(verb) => verb,
        }
    }
}

impl From<String> for Verb {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Verb> for String {
    fn from(verb: Verb) -> Self {
        verb.name().to_string()
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The payload of a dialogue choice link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoicePayload {
    /// The character being talked to.
    pub character_id: String,
    /// The entry the choice belongs to; absent accepts the active one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    /// The response picked.
    pub choice_id: String,
}

/// An action parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    /// A name, direction, or raw JSON payload.
    Text(String),
    /// A structured dialogue choice.
    Choice(ChoicePayload),
}

impl Default for Param {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl Param {
    /// The text of a textual parameter; empty for a choice.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Choice(_) => "",
        }
    }
}

/// One input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// What to do.
    pub verb: Verb,
    /// What to do it with.
    #[serde(default)]
    pub param: Param,
}

impl Action {
    /// An action with a textual parameter.
    pub fn new(verb: Verb, param: impl Into<String>) -> Self {
        Self {
            verb,
            param: Param::Text(param.into()),
        }
    }

    /// A dialogue choice action.
    pub fn choice(payload: ChoicePayload) -> Self {
        Self {
            verb: Verb::DialogChoice,
            param: Param::Choice(payload),
        }
    }

    /// Parse a typed command line such as `take šálek čaje`.
    ///
    /// `look at X` is read as `see X`.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match Verb::parse(verb) {
            Verb::Look if !rest.is_empty() => {
                let target = rest.strip_prefix("at ").unwrap_or(rest).trim();
                Self::new(Verb::See, target)
            }
            verb => Self::new(verb, rest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_aliases() {
        assert_eq!(Verb::parse("X"), Verb::See);
        assert_eq!(Verb::parse("examine"), Verb::See);
        assert_eq!(Verb::parse("get"), Verb::Take);
        assert_eq!(Verb::parse("i"), Verb::Inventory);
        assert_eq!(Verb::parse("dance"), Verb::Unknown("dance".to_string()));
        assert_eq!(Verb::DialogChoice.to_string(), "dialog-choice");
    }

    #[test]
    fn parse_command_line() {
        assert_eq!(
            Action::parse("  take   šálek čaje "),
            Action::new(Verb::Take, "šálek čaje")
        );
        assert_eq!(Action::parse("look"), Action::new(Verb::Look, ""));
        assert_eq!(Action::parse("look at stůl"), Action::new(Verb::See, "stůl"));
        assert_eq!(Action::parse(""), Action::new(Verb::Unknown(String::new()), ""));
    }

    #[test]
    fn deserializes_text_param() {
        let action: Action = serde_json::from_str(r#"{"verb": "go", "param": "Předsíň"}"#).unwrap();
        assert_eq!(action, Action::new(Verb::Go, "Předsíň"));

        let bare: Action = serde_json::from_str(r#"{"verb": "look"}"#).unwrap();
        assert_eq!(bare, Action::new(Verb::Look, ""));
    }

    #[test]
    fn deserializes_choice_param() {
        let action: Action = serde_json::from_str(
            r#"{"verb": "dialog-choice", "param": {"characterId": "babička", "choiceId": "tea"}}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::choice(ChoicePayload {
                character_id: "babička".to_string(),
                entry_id: None,
                choice_id: "tea".to_string(),
            })
        );
    }

    #[test]
    fn serializes_canonical_verb() {
        let json = serde_json::to_string(&Action::parse("x stůl")).unwrap();
        assert_eq!(json, r#"{"verb":"see","param":"stůl"}"#);
    }
}
