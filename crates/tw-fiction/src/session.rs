//! Interactive fiction session management.
//!
//! A [`FictionSession`] is the action dispatcher. Every action runs to
//! completion and is followed by a refresh of the affordance sections, or by
//! the ending once the end flag is set.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tw_core::{Document, EffectRule, Item, Location, PLAYER_ID, Value, World};

use crate::action::{Action, ChoicePayload, Param, Verb, resolver};
use crate::config::{EngineConfig, Messages};
use crate::dialogue::{DialogueEngine, DialogueState};
use crate::effects;
use crate::error::{FictionError, FictionResult};
use crate::narrator::{self, affordances};
use crate::output::{Output, Section};

/// A persisted game: the world snapshot plus the active dialogue threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    /// The world as it stood when saved.
    pub document: Document,
    /// Active dialogue threads.
    #[serde(default)]
    pub threads: DialogueState,
}

impl SavedGame {
    /// Parse a saved game from JSON text.
    pub fn from_json(source: &str) -> FictionResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> FictionResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// An interactive fiction session.
#[derive(Debug, Clone)]
pub struct FictionSession {
    world: World,
    dialogue: DialogueEngine,
    config: EngineConfig,
}

impl FictionSession {
    /// Create a session over a loaded world.
    pub fn new(world: World, config: EngineConfig) -> Self {
        Self {
            world,
            dialogue: DialogueEngine::new(),
            config,
        }
    }

    /// Restore a saved game. Threads naming a missing character or entry are
    /// dropped.
    pub fn resume(saved: SavedGame, config: EngineConfig) -> FictionResult<Self> {
        let world = World::load(saved.document)?;
        let mut threads = saved.threads;
        threads.retain(|character, entry| {
            let valid = world
                .character(character)
                .is_some_and(|c| c.entry(entry).is_some());
            if !valid {
                warn!(character, entry, "dropping stale dialogue thread");
            }
            valid
        });
        Ok(Self {
            world,
            dialogue: DialogueEngine::with_state(threads),
            config,
        })
    }

    /// Snapshot the session for persistence.
    pub fn save(&self) -> SavedGame {
        SavedGame {
            document: self.world.snapshot(),
            threads: self.dialogue.state().clone(),
        }
    }

    /// The world being played.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The active dialogue threads.
    pub fn dialogue(&self) -> &DialogueState {
        self.dialogue.state()
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether the end flag is set.
    pub fn is_ended(&self) -> bool {
        narrator::is_ended(&self.world, &self.config)
    }

    /// Show the title and intro pages, then look around.
    pub fn start(&mut self) -> FictionResult<Vec<Output>> {
        self.handle(Action::new(Verb::Start, ""))
    }

    /// Parse a typed command line and handle it.
    pub fn process(&mut self, line: &str) -> FictionResult<Vec<Output>> {
        self.handle(Action::parse(line))
    }

    /// Handle one action.
    ///
    /// Player mistakes are narrated. An error means a condition or `set` in
    /// the document is broken; the world may hold the effects applied before
    /// the failing statement.
    pub fn handle(&mut self, action: Action) -> FictionResult<Vec<Output>> {
        debug!(verb = %action.verb, param = action.param.text(), "handling action");
        if self.is_ended() {
            return self.conclude();
        }

        let mut out = self
            .dispatch(action)
            .inspect_err(|e| warn!(error = %e, "action failed"))?;
        out.extend(self.conclude()?);
        Ok(out)
    }

    fn dispatch(&mut self, action: Action) -> FictionResult<Vec<Output>> {
        let Action { verb, param } = action;
        match verb {
            Verb::Start => self.do_start(),
            Verb::Look => self.do_look(),
            Verb::Go => self.do_go(param.text()),
            Verb::See => self.do_see(param.text()),
            Verb::Take => self.do_take(param.text()),
            Verb::Drop => self.do_drop(param.text()),
            Verb::Use => self.do_use(param.text()),
            Verb::Talk => self.do_talk(param.text()),
            Verb::DialogChoice => self.do_choice(param),
            Verb::Inventory => Ok(self.do_inventory()),
            Verb::Unknown(verb) => Ok(vec![say(&self.config.messages.unknown_command, &verb)]),
        }
    }

    /// Affordances, or the ending once the game is over.
    fn conclude(&self) -> FictionResult<Vec<Output>> {
        if self.is_ended() {
            let mut out = vec![Output::append(narrator::ending(&self.world, &self.config)?)];
            out.extend(affordances::clear());
            return Ok(out);
        }
        affordances::render(&self.world, &self.config)
    }

    fn here(&self) -> FictionResult<&Location> {
        self.world
            .player_location()
            .ok_or(FictionError::PlayerNotPlaced)
    }

    // -----------------------------------------------------------------------
    // Verbs
    // -----------------------------------------------------------------------

    fn do_start(&mut self) -> FictionResult<Vec<Output>> {
        let mut out = vec![Output::replace(
            Section::Title,
            self.world.metadata.title.clone(),
        )];
        out.extend(self.world.intro.iter().map(|p| Output::append(p.page.clone())));
        out.extend(self.do_look()?);
        Ok(out)
    }

    fn do_look(&self) -> FictionResult<Vec<Output>> {
        let location = self.here()?;
        let text = narrator::describe(&location.descriptions, &self.world)?;
        Ok(non_empty(text).into_iter().collect())
    }

    fn do_go(&mut self, target: &str) -> FictionResult<Vec<Output>> {
        let location = self.here()?;
        let wanted = target.trim().to_lowercase();
        let destination = location
            .connections
            .iter()
            .find(|c| {
                c.direction.to_lowercase() == wanted
                    || c.target == target.trim()
                    || self
                        .world
                        .location(&c.target)
                        .is_some_and(|l| l.name.to_lowercase() == wanted)
            })
            .map(|c| c.target.clone());

        let Some(destination) = destination else {
            let directions: Vec<(&str, &str)> = location
                .connections
                .iter()
                .map(|c| (c.target.as_str(), c.direction.as_str()))
                .collect();
            let mut out = vec![Output::message(&self.config.messages.cannot_go)];
            out.extend(self.suggestion(&directions, target));
            return Ok(out);
        };

        debug!(from = %location.id, to = %destination, "player moves");
        self.world.set_player_location(&destination)?;
        self.do_look()
    }

    fn do_see(&mut self, name: &str) -> FictionResult<Vec<Output>> {
        let here = self.here()?.id.clone();
        let everything: Vec<(&str, &str)> = self
            .world
            .items()
            .map(|i| (i.id.as_str(), i.name.as_str()))
            .chain(
                self.world
                    .characters()
                    .filter(|c| c.id != PLAYER_ID)
                    .map(|c| (c.id.as_str(), c.name.as_str())),
            )
            .collect();
        let Some(id) = resolver::resolve(&everything, name).map(str::to_string) else {
            return Ok(self.not_found(&here, name));
        };

        if self.world.item(&id).is_some() {
            let item = match self.perceivable_item(&id, &here) {
                Ok(item) => item,
                Err(refusal) => return Ok(refusal),
            };
            let text = narrator::describe(&item.descriptions, &self.world)?;
            let rules = item.on_see.clone();

            let counter = format!("{id}:onSee:count");
            let seen = self
                .world
                .get_value(&counter, Value::Number(0.0))?
                .to_number()
                .unwrap_or_default();
            self.world.set_value(&counter, Value::Number(seen + 1.0))?;

            let mut out: Vec<Output> = non_empty(text).into_iter().collect();
            out.extend(narrations(effects::run_all(&rules, &mut self.world)?));
            return Ok(out);
        }

        let Some(character) = self.world.character(&id) else {
            return Ok(self.not_found(&here, name));
        };
        if !character.visible {
            return Ok(self.not_found(&here, name));
        }
        if character.location.as_deref() != Some(here.as_str()) {
            return Ok(vec![say(&self.config.messages.not_here, &character.name)]);
        }
        let text = narrator::describe(&character.descriptions, &self.world)?;
        Ok(non_empty(text).into_iter().collect())
    }

    fn do_take(&mut self, name: &str) -> FictionResult<Vec<Output>> {
        let messages = &self.config.messages;
        let here = self.here()?.id.clone();
        if let Some(item) = self.find_item(name).filter(|i| i.is_held()) {
            return Ok(vec![say(&messages.already_held, &item.name)]);
        }
        let item = match self.perceivable_item(name, &here) {
            Ok(item) => item,
            Err(refusal) => return Ok(refusal),
        };
        if !item.movable {
            return Ok(vec![say(&messages.cannot_take, &item.name)]);
        }

        let (id, rules) = (item.id.clone(), item.on_take.clone());
        let fallback = say(&messages.taken, &item.name);
        debug!(item = %id, "item taken");
        self.world
            .set_value(&format!("{id}:owner"), Value::text(PLAYER_ID))?;
        run_rules(&mut self.world, &rules, fallback)
    }

    fn do_drop(&mut self, name: &str) -> FictionResult<Vec<Output>> {
        let messages = &self.config.messages;
        let here = self.here()?.id.clone();
        let Some(item) = self.find_item(name).filter(|i| i.is_held()) else {
            return Ok(vec![say(&messages.not_held, name.trim())]);
        };

        let (id, rules) = (item.id.clone(), item.on_drop.clone());
        let fallback = say(&messages.dropped, &item.name);
        debug!(item = %id, location = %here, "item dropped");
        self.world
            .set_value(&format!("{id}:owner"), Value::text(here))?;
        run_rules(&mut self.world, &rules, fallback)
    }

    fn do_use(&mut self, name: &str) -> FictionResult<Vec<Output>> {
        let messages = &self.config.messages;
        let here = self.here()?.id.clone();
        let item = match self.perceivable_item(name, &here) {
            Ok(item) => item,
            Err(refusal) => return Ok(refusal),
        };
        if item.on_use.is_empty() {
            return Ok(vec![say(&messages.cannot_use, &item.name)]);
        }

        let rules = item.on_use.clone();
        let nothing = Output::message(&messages.nothing_happens);
        match effects::run_first(&rules, &mut self.world)? {
            Some(text) => Ok(narrations(text)),
            None => Ok(vec![nothing]),
        }
    }

    fn do_talk(&mut self, name: &str) -> FictionResult<Vec<Output>> {
        let here = self.here()?.id.clone();
        let people: Vec<(&str, &str)> = self
            .world
            .characters()
            .filter(|c| c.id != PLAYER_ID)
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();
        let Some(character) = resolver::resolve(&people, name).and_then(|id| self.world.character(id))
        else {
            return Ok(self.not_found(&here, name));
        };
        if !character.visible {
            return Ok(self.not_found(&here, name));
        }
        if character.location.as_deref() != Some(here.as_str()) {
            return Ok(vec![say(&self.config.messages.not_here, &character.name)]);
        }

        let id = character.id.clone();
        debug!(character = %id, "talking");
        self.dialogue
            .talk(&mut self.world, &id, &self.config.messages)
    }

    fn do_choice(&mut self, param: Param) -> FictionResult<Vec<Output>> {
        let unavailable = Output::message(&self.config.messages.not_available);
        let payload = match param {
            Param::Choice(payload) => payload,
            Param::Text(raw) => match serde_json::from_str::<ChoicePayload>(&raw) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "malformed dialogue choice");
                    return Ok(vec![unavailable]);
                }
            },
        };

        let here = self.here()?.id.as_str();
        let present = self
            .world
            .character(&payload.character_id)
            .is_some_and(|c| c.location.as_deref() == Some(here));
        if !present {
            return Ok(vec![unavailable]);
        }

        self.dialogue.choose(
            &mut self.world,
            &payload.character_id,
            payload.entry_id.as_deref(),
            &payload.choice_id,
            &self.config.messages,
        )
    }

    fn do_inventory(&self) -> Vec<Output> {
        let messages = &self.config.messages;
        let names: Vec<&str> = self
            .world
            .items_owned_by(PLAYER_ID)
            .map(|i| i.name.as_str())
            .collect();
        if names.is_empty() {
            vec![Output::message(&messages.inventory_empty)]
        } else {
            vec![say(&messages.inventory, &names.join(", "))]
        }
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    fn find_item(&self, name: &str) -> Option<&Item> {
        let items: Vec<(&str, &str)> = self
            .world
            .items()
            .map(|i| (i.id.as_str(), i.name.as_str()))
            .collect();
        resolver::resolve(&items, name).and_then(|id| self.world.item(id))
    }

    /// An item the player can perceive, or the narration refusing it.
    fn perceivable_item(&self, name: &str, here: &str) -> Result<&Item, Vec<Output>> {
        let Some(item) = self.find_item(name) else {
            return Err(self.not_found(here, name));
        };
        if !item.visible && !item.is_held() {
            return Err(self.not_found(here, name));
        }
        if !affordances::is_reachable(item, here) {
            return Err(vec![say(&self.config.messages.not_here, &item.name)]);
        }
        Ok(item)
    }

    /// Everything the player can currently perceive.
    fn nearby<'a>(&'a self, here: &'a str) -> Vec<(&'a str, &'a str)> {
        let items = self
            .world
            .items()
            .filter(|i| affordances::is_reachable(i, here))
            .map(|i| (i.id.as_str(), i.name.as_str()));
        let people = self
            .world
            .characters_at(here)
            .filter(|c| c.visible)
            .map(|c| (c.id.as_str(), c.name.as_str()));
        items.chain(people).collect()
    }

    fn not_found(&self, here: &str, name: &str) -> Vec<Output> {
        let mut out = vec![say(&self.config.messages.not_found, name.trim())];
        out.extend(self.suggestion(&self.nearby(here), name));
        out
    }

    fn suggestion(&self, candidates: &[(&str, &str)], input: &str) -> Option<Output> {
        resolver::suggest(candidates, input).map(|name| say(&self.config.messages.did_you_mean, name))
    }
}

/// A plain-text message with its `{name}` filled in.
fn say(template: &str, name: &str) -> Output {
    Output::message(&Messages::format(template, name))
}

fn non_empty(text: String) -> Option<Output> {
    (!text.is_empty()).then(|| Output::append(text))
}

fn narrations(texts: impl IntoIterator<Item = String>) -> Vec<Output> {
    texts.into_iter().filter_map(non_empty).collect()
}

/// Run every firing rule of a take or drop; without rules, narrate the
/// fallback.
fn run_rules(
    world: &mut World,
    rules: &[EffectRule],
    fallback: Output,
) -> FictionResult<Vec<Output>> {
    if rules.is_empty() {
        return Ok(vec![fallback]);
    }
    Ok(narrations(effects::run_all(rules, world)?))
}
