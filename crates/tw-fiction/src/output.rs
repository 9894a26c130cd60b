//! Output events and the HTML fragments they carry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named region of the presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// Story title.
    #[serde(rename = "game-title")]
    Title,
    /// Current location name and description.
    #[serde(rename = "game-location")]
    Location,
    /// Characters the player can talk to.
    #[serde(rename = "game-characters")]
    Characters,
    /// Items the player can examine.
    #[serde(rename = "game-items")]
    Items,
    /// Items the player can pick up.
    #[serde(rename = "game-take")]
    Take,
    /// Items the player can put down.
    #[serde(rename = "game-drop")]
    Drop,
    /// Items the player can use.
    #[serde(rename = "game-use")]
    Use,
    /// Exits from the current location.
    #[serde(rename = "game-go")]
    Go,
}

impl Section {
    /// Sections refreshed after every action.
    pub const AFFORDANCES: [Section; 7] = [
        Self::Location,
        Self::Characters,
        Self::Items,
        Self::Take,
        Self::Drop,
        Self::Use,
        Self::Go,
    ];

    /// The element id of the section.
    pub fn id(self) -> &'static str {
        match self {
            Self::Title => "game-title",
            Self::Location => "game-location",
            Self::Characters => "game-characters",
            Self::Items => "game-items",
            Self::Take => "game-take",
            Self::Drop => "game-drop",
            Self::Use => "game-use",
            Self::Go => "game-go",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Id of the scrollback region that unsectioned output is appended to.
pub const SCROLLBACK: &str = "game-output";

/// One output event. With a section the text replaces that region; without
/// one it is appended to the scrollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// HTML fragment.
    pub text: String,
    /// Target section; absent appends to the scrollback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
}

impl Output {
    /// Text appended to the scrollback.
    pub fn append(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            section: None,
        }
    }

    /// Text replacing a section.
    pub fn replace(section: Section, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            section: Some(section),
        }
    }

    /// A plain-text message wrapped in a paragraph.
    pub fn message(text: &str) -> Self {
        Self::append(paragraph(&escape(text)))
    }
}

/// Escape text for inclusion in HTML content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Wrap an HTML fragment in `<p>`.
pub fn paragraph(html: &str) -> String {
    format!("<p>{html}</p>")
}

/// A clickable affordance.
pub fn action_link(action: &str, param: &str, label: &str) -> String {
    format!(
        r#"<a class="game-action" data-action="{}" data-param="{}">{}</a>"#,
        escape(action),
        escape(param),
        escape(label)
    )
}

/// An unordered list of HTML fragments, or nothing when empty.
pub fn list(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul>");
    for item in items {
        out.push_str("<li>");
        out.push_str(item);
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}
