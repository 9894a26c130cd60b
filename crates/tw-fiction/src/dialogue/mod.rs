//! Per-character conversation threads.
//!
//! Talking to a character presents the first `onTalk` entry whose guard
//! holds. An entry with an id and responses pauses the character there until
//! the player picks a response or the guard stops holding.

pub mod state;

use serde_json::json;
use tracing::{debug, warn};
use tw_core::{DialogueEntry, World};

pub use state::DialogueState;

use crate::config::Messages;
use crate::effects;
use crate::error::FictionResult;
use crate::output::{Output, action_link, escape, list, paragraph};

/// The dialogue state machine. Owns the active threads.
#[derive(Debug, Clone, Default)]
pub struct DialogueEngine {
    state: DialogueState,
}

impl DialogueEngine {
    /// Create an engine with every character idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine resuming saved threads.
    pub fn with_state(state: DialogueState) -> Self {
        Self { state }
    }

    /// The active threads.
    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    /// Talk to a character.
    ///
    /// An active thread is re-presented without re-applying its `set`. If its
    /// guard no longer holds, the thread is abandoned and the entries are
    /// scanned afresh.
    pub fn talk(
        &mut self,
        world: &mut World,
        character: &str,
        messages: &Messages,
    ) -> FictionResult<Vec<Output>> {
        let Some((name, entries)) = world
            .character(character)
            .map(|c| (c.name.clone(), c.on_talk.clone()))
        else {
            return Ok(vec![Output::message(&messages.not_available)]);
        };

        if let Some(active) = self.state.active(character).map(str::to_string) {
            let entry = entries
                .iter()
                .find(|e| e.id.as_deref() == Some(active.as_str()));
            match entry {
                Some(entry) if effects::holds(entry.condition.as_deref(), world)? => {
                    debug!(character, entry = %active, "re-presenting dialogue entry");
                    return self.present(world, character, entry, false);
                }
                _ => {
                    warn!(character, entry = %active, "abandoning dialogue thread");
                    self.state.end(character);
                }
            }
        }

        for entry in &entries {
            if effects::holds(entry.condition.as_deref(), world)? {
                return self.present(world, character, entry, true);
            }
        }
        Ok(vec![Output::message(&Messages::format(
            &messages.cannot_talk,
            &name,
        ))])
    }

    /// Pick a response of the character's active entry.
    ///
    /// Anything that does not match the active thread (wrong entry, unknown
    /// choice, failed guard) is narrated as unavailable and changes nothing.
    pub fn choose(
        &mut self,
        world: &mut World,
        character: &str,
        entry_id: Option<&str>,
        choice_id: &str,
        messages: &Messages,
    ) -> FictionResult<Vec<Output>> {
        let unavailable = || Ok(vec![Output::message(&messages.not_available)]);

        let Some(active) = self.state.active(character).map(str::to_string) else {
            return unavailable();
        };
        if entry_id.is_some_and(|e| e != active) {
            return unavailable();
        }
        let entries = world
            .character(character)
            .map(|c| c.on_talk.clone())
            .unwrap_or_default();
        let Some(entry) = find_entry(&entries, &active) else {
            return unavailable();
        };
        let Some(response) = entry.responses.iter().find(|r| r.id == choice_id) else {
            return unavailable();
        };
        if !effects::holds(response.condition.as_deref(), world)? {
            return unavailable();
        }

        debug!(character, entry = %active, choice = choice_id, "dialogue choice");
        let mut out = Vec::new();
        if let Some(text) = response.text.as_deref() {
            out.push(Output::append(paragraph(&escape(text))));
        }
        effects::apply(response.set.as_deref(), world)?;

        match response.next.as_deref() {
            Some(next) => match find_entry(&entries, next) {
                Some(next_entry) => out.extend(self.present(world, character, next_entry, true)?),
                None => {
                    warn!(character, next, "dialogue response names a missing entry");
                    self.state.end(character);
                    out.push(Output::message(&messages.not_available));
                }
            },
            None => self.state.end(character),
        }
        Ok(out)
    }

    fn present(
        &mut self,
        world: &mut World,
        character: &str,
        entry: &DialogueEntry,
        apply_set: bool,
    ) -> FictionResult<Vec<Output>> {
        let mut out = Vec::new();
        if let Some(text) = entry.description.as_deref().filter(|t| !t.is_empty()) {
            out.push(Output::append(text));
        }
        if apply_set {
            effects::apply(entry.set.as_deref(), world)?;
        }

        // Only an entry with an id can be resumed.
        match entry.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) if !entry.responses.is_empty() => {
                debug!(character, entry = id, "awaiting dialogue response");
                self.state.begin(character, id);
            }
            _ => self.state.end(character),
        }

        let options = options(world, character, entry)?;
        if !options.is_empty() {
            out.push(Output::append(options));
        }
        Ok(out)
    }
}

fn find_entry<'a>(entries: &'a [DialogueEntry], id: &str) -> Option<&'a DialogueEntry> {
    entries.iter().find(|e| e.id.as_deref() == Some(id))
}

/// Render the responses whose guard holds as choice links.
fn options(world: &World, character: &str, entry: &DialogueEntry) -> FictionResult<String> {
    let entry_id = entry.id.as_deref().unwrap_or_default();
    let mut links = Vec::new();
    for response in &entry.responses {
        if !effects::holds(response.condition.as_deref(), world)? {
            continue;
        }
        let payload = json!({
            "characterId": character,
            "entryId": entry_id,
            "choiceId": response.id,
        });
        let label = response.text.as_deref().unwrap_or(&response.id);
        links.push(action_link("dialog-choice", &payload.to_string(), label));
    }
    Ok(list(&links))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::Value;

    const WORLD: &str = r#"{
        "locations": [{"id": "kuchyně", "name": "Kuchyně"}],
        "items": [{"id": "šálek", "name": "Šálek", "owner": "kuchyně"}],
        "characters": [
            {"id": "player", "name": "Venda", "location": "kuchyně"},
            {
                "id": "babička", "name": "Babička", "location": "kuchyně",
                "onTalk": [
                    {
                        "id": "greet",
                        "condition": "!angry",
                        "description": "<p>Hello dear.</p>",
                        "set": "visits = visits + 1",
                        "responses": [
                            {"id": "tea", "text": "Tea, please <3", "set": "wants_tea = true", "next": "tea"},
                            {"id": "bye", "text": "Bye"},
                            {"id": "secret", "text": "Tell me", "condition": "knows_secret"},
                            {"id": "lost", "text": "Wander off", "next": "nowhere"}
                        ]
                    },
                    {"description": "<p>Hmph.</p>"},
                    {"id": "tea", "description": "<p>Here you go.</p>", "set": "šálek:owner = player"}
                ]
            },
            {"id": "kocour", "name": "Kocour", "location": "kuchyně"}
        ],
        "variables": [
            {"id": "angry", "value": false},
            {"id": "knows_secret", "value": false},
            {"id": "wants_tea", "value": false},
            {"id": "visits", "value": 0}
        ]
    }"#;

    fn setup() -> (World, DialogueEngine, Messages) {
        (
            World::from_json(WORLD).unwrap(),
            DialogueEngine::new(),
            Messages::default(),
        )
    }

    fn text(out: &[Output]) -> String {
        out.iter().map(|o| o.text.as_str()).collect()
    }

    #[test]
    fn talk_presents_first_matching_entry() {
        let (mut w, mut engine, messages) = setup();
        let out = engine.talk(&mut w, "babička", &messages).unwrap();
        let html = text(&out);
        assert!(html.starts_with("<p>Hello dear.</p>"));
        assert!(html.contains("Tea, please"));
        assert!(html.contains("Bye"));
        assert!(!html.contains("Tell me"));
        assert_eq!(engine.state().active("babička"), Some("greet"));
        assert_eq!(engine.state().len(), 1);
        assert_eq!(w.lookup("visits").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn option_links_carry_choice_payload() {
        let (mut w, mut engine, messages) = setup();
        let html = text(&engine.talk(&mut w, "babička", &messages).unwrap());
        assert!(html.contains(
            "{&quot;characterId&quot;:&quot;babička&quot;,&quot;choiceId&quot;:&quot;tea&quot;,&quot;entryId&quot;:&quot;greet&quot;}"
        ));
    }

    #[test]
    fn talking_again_re_presents_without_set() {
        let (mut w, mut engine, messages) = setup();
        engine.talk(&mut w, "babička", &messages).unwrap();
        let html = text(&engine.talk(&mut w, "babička", &messages).unwrap());
        assert!(html.contains("Hello dear."));
        assert_eq!(w.lookup("visits").unwrap(), Value::Number(1.0));
        assert_eq!(engine.state().active("babička"), Some("greet"));
    }

    #[test]
    fn failed_guard_abandons_thread() {
        let (mut w, mut engine, messages) = setup();
        engine.talk(&mut w, "babička", &messages).unwrap();
        w.set_value("angry", Value::Bool(true)).unwrap();
        let html = text(&engine.talk(&mut w, "babička", &messages).unwrap());
        assert_eq!(html, "<p>Hmph.</p>");
        assert!(engine.state().is_empty());
    }

    #[test]
    fn choosing_follows_next() {
        let (mut w, mut engine, messages) = setup();
        engine.talk(&mut w, "babička", &messages).unwrap();
        let out = engine
            .choose(&mut w, "babička", Some("greet"), "tea", &messages)
            .unwrap();
        assert_eq!(
            text(&out),
            "<p>Tea, please &lt;3</p><p>Here you go.</p>"
        );
        assert_eq!(w.lookup("wants_tea").unwrap(), Value::Bool(true));
        assert!(w.item("šálek").unwrap().is_held());
        assert!(engine.state().is_empty());
    }

    #[test]
    fn choosing_without_next_returns_to_idle() {
        let (mut w, mut engine, messages) = setup();
        engine.talk(&mut w, "babička", &messages).unwrap();
        let out = engine.choose(&mut w, "babička", None, "bye", &messages).unwrap();
        assert_eq!(text(&out), "<p>Bye</p>");
        assert!(engine.state().is_empty());
    }

    #[test]
    fn invalid_choices_leave_thread_unchanged() {
        let (mut w, mut engine, messages) = setup();
        engine.talk(&mut w, "babička", &messages).unwrap();
        let expected = Output::message(&messages.not_available);

        for (entry, choice) in [(Some("greet"), "nope"), (Some("tea"), "tea"), (None, "secret")] {
            let out = engine.choose(&mut w, "babička", entry, choice, &messages).unwrap();
            assert_eq!(out, vec![expected.clone()]);
            assert_eq!(engine.state().active("babička"), Some("greet"));
        }
    }

    #[test]
    fn choice_without_thread_is_unavailable() {
        let (mut w, mut engine, messages) = setup();
        let out = engine.choose(&mut w, "babička", None, "tea", &messages).unwrap();
        assert_eq!(out, vec![Output::message(&messages.not_available)]);
        assert!(engine.state().is_empty());
    }

    #[test]
    fn missing_next_entry_ends_thread() {
        let (mut w, mut engine, messages) = setup();
        engine.talk(&mut w, "babička", &messages).unwrap();
        let out = engine.choose(&mut w, "babička", None, "lost", &messages).unwrap();
        assert_eq!(out.last(), Some(&Output::message(&messages.not_available)));
        assert!(engine.state().is_empty());
    }

    #[test]
    fn silent_character() {
        let (mut w, mut engine, messages) = setup();
        let out = engine.talk(&mut w, "kocour", &messages).unwrap();
        assert_eq!(text(&out), "<p>Kocour has nothing to say.</p>");
    }
}
