//! Terminal rendering of output events.
//!
//! The engine speaks HTML fragments. Here they are flattened to plain text,
//! and every `game-action` link becomes a numbered choice the player can
//! type instead of a command.

use colored::{ColoredString, Colorize};
use tw_fiction::{Action, Output, Param, Section, Verb};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Link {
    action: String,
    param: String,
}

/// Flattens output batches and remembers the links of the last one.
#[derive(Debug, Default)]
pub struct Renderer {
    links: Vec<Link>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a batch. Link numbers restart with every batch.
    pub fn render(&mut self, outputs: &[Output]) -> String {
        self.links.clear();
        let mut out = String::new();
        for output in outputs {
            let text = self.plain(&output.text);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            match output.section {
                None => {
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                Some(Section::Title) => {
                    out.push_str(&format!("*** {} ***\n\n", text.bold()));
                }
                // The description already went to the scrollback.
                Some(Section::Location) => {
                    let heading = text.lines().next().unwrap_or_default();
                    out.push_str(&format!("{} {}\n", label(Section::Location), heading.bold()));
                }
                Some(section) => {
                    let inline: Vec<&str> = text
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .collect();
                    out.push_str(&format!("{} {}\n", label(section), inline.join("  ")));
                }
            }
        }
        if outputs.iter().any(|o| o.section.is_some()) {
            out.push('\n');
        }
        out
    }

    /// The action behind link `n` (1-based) of the last batch.
    pub fn link(&self, n: usize) -> Option<Action> {
        let link = self.links.get(n.checked_sub(1)?)?;
        Some(Action {
            verb: Verb::parse(&link.action),
            param: Param::Text(link.param.clone()),
        })
    }

    fn plain(&mut self, html: &str) -> String {
        let mut out = String::new();
        let mut rest = html;
        while let Some(open) = rest.find('<') {
            out.push_str(&unescape(&rest[..open]));
            let Some(len) = rest[open..].find('>') else {
                break;
            };
            let tag = &rest[open + 1..open + len];
            rest = &rest[open + len + 1..];

            let name = tag.split_whitespace().next().unwrap_or_default();
            match name.to_ascii_lowercase().as_str() {
                "a" => {
                    if let (Some(action), Some(param)) =
                        (attribute(tag, "data-action"), attribute(tag, "data-param"))
                    {
                        self.links.push(Link { action, param });
                        out.push_str(&format!("[{}] ", self.links.len()));
                    }
                }
                "br" | "br/" | "/p" | "/li" | "/div" | "/h1" | "/h2" | "/h3" => out.push('\n'),
                _ => {}
            }
        }
        out.push_str(&unescape(rest));
        out
    }
}

fn label(section: Section) -> ColoredString {
    let text = match section {
        Section::Title => "Title:",
        Section::Location => "You are in:",
        Section::Characters => "People:",
        Section::Items => "You see:",
        Section::Take => "Take:",
        Section::Drop => "Drop:",
        Section::Use => "Use:",
        Section::Go => "Exits:",
    };
    text.cyan()
}

/// The unescaped value of `name="..."` inside a tag.
fn attribute(tag: &str, name: &str) -> Option<String> {
    let key = format!("{name}=\"");
    let start = tag.find(&key)? + key.len();
    let len = tag[start..].find('"')?;
    Some(unescape(&tag[start..start + len]))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_fiction::output::{action_link, list};

    #[test]
    fn flattens_paragraphs() {
        let mut r = Renderer::new();
        let out = r.render(&[Output::append("<p>A small &lt;kitchen&gt;.</p><p>Warm.</p>")]);
        assert_eq!(out, "A small <kitchen>.\nWarm.\n\n");
    }

    #[test]
    fn numbers_links_in_order() {
        colored::control::set_override(false);
        let mut r = Renderer::new();
        let links = list(&[
            action_link("talk", "babička", "Babička"),
            action_link("go", "Předsíň", "Předsíň"),
        ]);
        let out = r.render(&[Output::replace(Section::Go, links)]);
        assert_eq!(out, "Exits: [1] Babička  [2] Předsíň\n\n");

        assert_eq!(r.link(1), Some(Action::new(Verb::Talk, "babička")));
        assert_eq!(r.link(2), Some(Action::new(Verb::Go, "Předsíň")));
        assert_eq!(r.link(0), None);
        assert_eq!(r.link(3), None);
    }

    #[test]
    fn choice_payload_survives_escaping() {
        let mut r = Renderer::new();
        let payload = r#"{"characterId":"babička","entryId":"greet","choiceId":"tea"}"#;
        r.render(&[Output::append(list(&[action_link("dialog-choice", payload, "Tea")]))]);
        assert_eq!(r.link(1), Some(Action::new(Verb::DialogChoice, payload)));
    }

    #[test]
    fn empty_sections_are_skipped() {
        let mut r = Renderer::new();
        let out = r.render(&[Output::replace(Section::Items, "")]);
        assert_eq!(out, "\n");
    }
}
