use std::collections::{HashMap, HashSet};

use crate::document::{
    CharacterDef, Document, IntroPage, ItemDef, Metadata, normalize_flag, normalize_variable_value,
};
use crate::entity::{
    Character, Ending, EntityKind, EntityRef, Item, Location, PLAYER_ID, Variable,
};
use crate::error::{CoreError, CoreResult};
use crate::path::Path;
use crate::value::{Attribute, Attributes, Value};

/// The central world model. Owns every entity and all mutable game state.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    /// Title and authoring metadata.
    pub metadata: Metadata,
    /// Intro pages shown at session start.
    pub intro: Vec<IntroPage>,
    locations: Vec<Location>,
    items: Vec<Item>,
    characters: Vec<Character>,
    endings: Vec<Ending>,
    variables: Vec<Variable>,

    // Index: ids are globally unique, so one map covers every kind.
    by_id: HashMap<String, (EntityKind, usize)>,
}

impl World {
    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Validate a document and build the world from it.
    ///
    /// Normalization (flag coercion, textual booleans in variables, empty
    /// owners) happens here and nowhere else.
    pub fn load(document: Document) -> CoreResult<Self> {
        validate(&document)?;

        let Document {
            metadata,
            intro,
            locations,
            items,
            characters,
            endings,
            variables,
        } = document;

        let mut world = Self {
            metadata,
            intro,
            locations,
            items: items.into_iter().map(ItemDef::normalize).collect(),
            characters: characters
                .into_iter()
                .map(CharacterDef::normalize)
                .collect(),
            endings,
            variables: variables
                .into_iter()
                .map(|mut v| {
                    v.value = normalize_variable_value(v.value);
                    v
                })
                .collect(),
            by_id: HashMap::new(),
        };
        world.reindex();
        Ok(world)
    }

    /// Parse JSON text and load it.
    pub fn from_json(source: &str) -> CoreResult<Self> {
        Self::load(Document::from_json(source)?)
    }

    /// Produce a document that loads back into an equal world.
    pub fn snapshot(&self) -> Document {
        Document {
            metadata: self.metadata.clone(),
            intro: self.intro.clone(),
            locations: self.locations.clone(),
            items: self.items.iter().map(ItemDef::from).collect(),
            characters: self.characters.iter().map(CharacterDef::from).collect(),
            endings: self.endings.clone(),
            variables: self.variables.clone(),
        }
    }

    fn reindex(&mut self) {
        let mut by_id = HashMap::new();
        for (i, e) in self.locations.iter().enumerate() {
            by_id.insert(e.id.clone(), (EntityKind::Location, i));
        }
        for (i, e) in self.items.iter().enumerate() {
            by_id.insert(e.id.clone(), (EntityKind::Item, i));
        }
        for (i, e) in self.characters.iter().enumerate() {
            by_id.insert(e.id.clone(), (EntityKind::Character, i));
        }
        for (i, e) in self.endings.iter().enumerate() {
            by_id.insert(e.id.clone(), (EntityKind::Ending, i));
        }
        for (i, e) in self.variables.iter().enumerate() {
            by_id.insert(e.id.clone(), (EntityKind::Variable, i));
        }
        self.by_id = by_id;
    }

    // -----------------------------------------------------------------------
    // Entity access
    // -----------------------------------------------------------------------

    /// Find an entity of any kind by id.
    pub fn get_by_id(&self, id: &str) -> Option<EntityRef<'_>> {
        let &(kind, i) = self.by_id.get(id)?;
        Some(match kind {
            EntityKind::Location => EntityRef::Location(&self.locations[i]),
            EntityKind::Item => EntityRef::Item(&self.items[i]),
            EntityKind::Character => EntityRef::Character(&self.characters[i]),
            EntityKind::Ending => EntityRef::Ending(&self.endings[i]),
            EntityKind::Variable => EntityRef::Variable(&self.variables[i]),
        })
    }

    /// Find a location by id.
    pub fn location(&self, id: &str) -> Option<&Location> {
        match self.get_by_id(id)? {
            EntityRef::Location(l) => Some(l),
            _ => None,
        }
    }

    /// Find an item by id.
    pub fn item(&self, id: &str) -> Option<&Item> {
        match self.get_by_id(id)? {
            EntityRef::Item(i) => Some(i),
            _ => None,
        }
    }

    /// Find a character by id.
    pub fn character(&self, id: &str) -> Option<&Character> {
        match self.get_by_id(id)? {
            EntityRef::Character(c) => Some(c),
            _ => None,
        }
    }

    /// Find an ending by id.
    pub fn ending(&self, id: &str) -> Option<&Ending> {
        match self.get_by_id(id)? {
            EntityRef::Ending(e) => Some(e),
            _ => None,
        }
    }

    /// Find a variable by id.
    pub fn variable(&self, id: &str) -> Option<&Variable> {
        match self.get_by_id(id)? {
            EntityRef::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// All locations in document order.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    /// All items in document order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// All characters in document order.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    /// All endings in document order.
    pub fn endings(&self) -> impl Iterator<Item = &Ending> {
        self.endings.iter()
    }

    /// All variables in document order, including ones created at runtime.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    /// The player character.
    pub fn player(&self) -> Option<&Character> {
        self.character(PLAYER_ID)
    }

    /// The location the player is in.
    pub fn player_location(&self) -> Option<&Location> {
        self.player()
            .and_then(|p| p.location.as_deref())
            .and_then(|id| self.location(id))
    }

    /// Move the player to a location.
    pub fn set_player_location(&mut self, location: &str) -> CoreResult<()> {
        self.set_value(&format!("{PLAYER_ID}:location"), Value::text(location))
    }

    /// Items whose owner is the given location or character id.
    pub fn items_owned_by<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.iter().filter(move |i| i.is_at(owner))
    }

    /// Non-player characters at the given location.
    pub fn characters_at<'a>(
        &'a self,
        location: &'a str,
    ) -> impl Iterator<Item = &'a Character> + 'a {
        self.characters
            .iter()
            .filter(move |c| c.id != PLAYER_ID && c.location.as_deref() == Some(location))
    }

    // -----------------------------------------------------------------------
    // Path addressing
    // -----------------------------------------------------------------------

    /// Strict read. Unknown variables, entities, and attributes are errors.
    pub fn lookup(&self, raw: &str) -> CoreResult<Value> {
        let path = Path::parse(raw)?;
        if path.is_bare() {
            return self
                .variable(path.root())
                .map(|v| v.value.clone())
                .ok_or_else(|| CoreError::UnknownPath(raw.to_string()));
        }

        let entity = self
            .get_by_id(path.root())
            .ok_or_else(|| CoreError::UnknownPath(raw.to_string()))?;
        let attrs = path.attrs();
        if let Some(value) = read_field(entity, &attrs[0]) {
            if attrs.len() > 1 {
                return Err(CoreError::NotAContainer(raw.to_string()));
            }
            return Ok(value);
        }

        let mut node = entity
            .attributes()
            .get(&attrs[0])
            .ok_or_else(|| CoreError::UnknownPath(raw.to_string()))?;
        for seg in &attrs[1..] {
            node = match node {
                Attribute::Map(map) => map
                    .get(seg)
                    .ok_or_else(|| CoreError::UnknownPath(raw.to_string()))?,
                Attribute::Value(_) => return Err(CoreError::NotAContainer(raw.to_string())),
            };
        }
        node.as_value()
            .cloned()
            .ok_or_else(|| CoreError::NotAScalar(raw.to_string()))
    }

    /// Lenient read. When the addressed value is absent, `default` is
    /// written into the model and returned, so later reads see it.
    ///
    /// If the root entity of a multi-segment path does not exist, `default`
    /// is returned without writing anything.
    pub fn get_value(&mut self, raw: &str, default: Value) -> CoreResult<Value> {
        let path = Path::parse(raw)?;
        if path.is_bare() {
            return match self.by_id.get(path.root()) {
                Some(&(EntityKind::Variable, i)) => Ok(self.variables[i].value.clone()),
                Some(_) => Err(CoreError::NotAScalar(raw.to_string())),
                None => {
                    self.insert_variable(path.root(), default.clone());
                    Ok(default)
                }
            };
        }

        let Some(&(kind, index)) = self.by_id.get(path.root()) else {
            return Ok(default);
        };
        let attrs = path.attrs();
        if is_field(kind, &attrs[0]) {
            if attrs.len() > 1 {
                return Err(CoreError::NotAContainer(raw.to_string()));
            }
            return self.lookup(raw);
        }

        let Some((last, parents)) = attrs.split_last() else {
            return Err(CoreError::InvalidPath(raw.to_string()));
        };
        let container = walk_mut(self.attributes_mut(kind, index), parents, raw)?;
        match container
            .entry(last.clone())
            .or_insert_with(|| Attribute::Value(default))
        {
            Attribute::Value(v) => Ok(v.clone()),
            Attribute::Map(_) => Err(CoreError::NotAScalar(raw.to_string())),
        }
    }

    /// Write a value. A bare path writes (or creates) a variable; a longer
    /// path creates intermediate containers as needed.
    pub fn set_value(&mut self, raw: &str, value: Value) -> CoreResult<()> {
        let path = Path::parse(raw)?;
        if path.is_bare() {
            return match self.by_id.get(path.root()) {
                Some(&(EntityKind::Variable, i)) => {
                    self.variables[i].value = value;
                    Ok(())
                }
                Some(_) => Err(CoreError::NotAScalar(raw.to_string())),
                None => {
                    self.insert_variable(path.root(), value);
                    Ok(())
                }
            };
        }

        let &(kind, index) = self
            .by_id
            .get(path.root())
            .ok_or_else(|| CoreError::UnknownEntity(path.root().to_string()))?;
        let attrs = path.attrs();
        if is_field(kind, &attrs[0]) {
            if attrs.len() > 1 {
                return Err(CoreError::NotAContainer(raw.to_string()));
            }
            return self.write_field(kind, index, &attrs[0], value, raw);
        }

        let Some((last, parents)) = attrs.split_last() else {
            return Err(CoreError::InvalidPath(raw.to_string()));
        };
        let container = walk_mut(self.attributes_mut(kind, index), parents, raw)?;
        container.insert(last.clone(), Attribute::Value(value));
        Ok(())
    }

    fn insert_variable(&mut self, id: &str, value: Value) {
        self.by_id.insert(
            id.to_string(),
            (EntityKind::Variable, self.variables.len()),
        );
        self.variables.push(Variable::new(id, value));
    }

    fn attributes_mut(&mut self, kind: EntityKind, index: usize) -> &mut Attributes {
        match kind {
            EntityKind::Location => &mut self.locations[index].attributes,
            EntityKind::Item => &mut self.items[index].attributes,
            EntityKind::Character => &mut self.characters[index].attributes,
            EntityKind::Ending => &mut self.endings[index].attributes,
            EntityKind::Variable => &mut self.variables[index].attributes,
        }
    }

    /// Target of a placement write. Empty text clears the placement; anything
    /// else must name an entity of one of the `allowed` kinds.
    fn placement(
        &self,
        from: &str,
        value: &Value,
        allowed: &[EntityKind],
        expected: &'static str,
    ) -> CoreResult<Option<String>> {
        let target = value.to_string();
        if target.is_empty() {
            return Ok(None);
        }
        match self.by_id.get(&target) {
            Some((kind, _)) if allowed.contains(kind) => Ok(Some(target)),
            _ => Err(CoreError::InvalidReference {
                from: from.to_string(),
                target,
                expected,
            }),
        }
    }

    fn write_field(
        &mut self,
        kind: EntityKind,
        index: usize,
        field: &str,
        value: Value,
        raw: &str,
    ) -> CoreResult<()> {
        match (kind, field) {
            (_, "id") => return Err(CoreError::ReadOnly(raw.to_string())),
            (EntityKind::Location, "name") => self.locations[index].name = value.to_string(),
            (EntityKind::Item, "name") => self.items[index].name = value.to_string(),
            (EntityKind::Character, "name") => self.characters[index].name = value.to_string(),
            (EntityKind::Item, "owner") => {
                let owner = self.placement(
                    &self.items[index].id,
                    &value,
                    &[EntityKind::Location, EntityKind::Character],
                    "location or character",
                )?;
                self.items[index].owner = owner;
            }
            (EntityKind::Item, "visible") => {
                self.items[index].visible = normalize_flag(Some(&value));
            }
            (EntityKind::Item, "movable") => {
                self.items[index].movable = normalize_flag(Some(&value));
            }
            (EntityKind::Character, "location") => {
                let from = &self.characters[index].id;
                let location = self.placement(from, &value, &[EntityKind::Location], "location")?;
                // The player always stands somewhere.
                if location.is_none() && from == PLAYER_ID {
                    return Err(CoreError::InvalidReference {
                        from: PLAYER_ID.to_string(),
                        target: String::new(),
                        expected: "location",
                    });
                }
                self.characters[index].location = location;
            }
            (EntityKind::Character, "visible") => {
                self.characters[index].visible = normalize_flag(Some(&value));
            }
            (EntityKind::Variable, "value") => self.variables[index].value = value,
            _ => return Err(CoreError::UnknownPath(raw.to_string())),
        }
        Ok(())
    }
}

/// Typed scalar fields addressable as the first attribute segment.
fn is_field(kind: EntityKind, field: &str) -> bool {
    matches!(
        (kind, field),
        (_, "id")
            | (
                EntityKind::Location | EntityKind::Item | EntityKind::Character,
                "name"
            )
            | (EntityKind::Item, "owner" | "visible" | "movable")
            | (EntityKind::Character, "location" | "visible")
            | (EntityKind::Variable, "value")
    )
}

fn read_field(entity: EntityRef<'_>, field: &str) -> Option<Value> {
    if !is_field(entity.kind(), field) {
        return None;
    }
    let value = match (entity, field) {
        (e, "id") => Value::text(e.id()),
        (e, "name") => Value::text(e.name()),
        (EntityRef::Item(i), "owner") => Value::text(i.owner.clone().unwrap_or_default()),
        (EntityRef::Item(i), "visible") => Value::Bool(i.visible),
        (EntityRef::Item(i), "movable") => Value::Bool(i.movable),
        (EntityRef::Character(c), "location") => {
            Value::text(c.location.clone().unwrap_or_default())
        }
        (EntityRef::Character(c), "visible") => Value::Bool(c.visible),
        (EntityRef::Variable(v), "value") => v.value.clone(),
        _ => return None,
    };
    Some(value)
}


/// Descend through `segments`, creating empty containers where absent.
fn walk_mut<'a>(
    attrs: &'a mut Attributes,
    segments: &[String],
    raw: &str,
) -> CoreResult<&'a mut Attributes> {
    let mut node = attrs;
    for seg in segments {
        let entry = node
            .entry(seg.clone())
            .or_insert_with(|| Attribute::Map(Attributes::new()));
        node = match entry {
            Attribute::Map(map) => map,
            Attribute::Value(_) => return Err(CoreError::NotAContainer(raw.to_string())),
        };
    }
    Ok(node)
}

fn validate(document: &Document) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for id in document.all_ids() {
        if id.trim().is_empty() {
            return Err(CoreError::Validation("entity with an empty id".to_string()));
        }
        if id.contains(':') {
            return Err(CoreError::Validation(format!(
                "id \"{id}\" must not contain ':'"
            )));
        }
        if !seen.insert(id) {
            return Err(CoreError::DuplicateId(id.to_string()));
        }
    }

    let is_location = |id: &str| document.locations.iter().any(|l| l.id == id);
    let is_character = |id: &str| document.characters.iter().any(|c| c.id == id);

    let player = document
        .characters
        .iter()
        .find(|c| c.id == PLAYER_ID)
        .ok_or(CoreError::MissingPlayer)?;
    match player.location.as_deref() {
        Some(loc) if is_location(loc) => {}
        other => {
            return Err(CoreError::InvalidReference {
                from: PLAYER_ID.to_string(),
                target: other.unwrap_or_default().to_string(),
                expected: "location",
            });
        }
    }

    for location in &document.locations {
        for conn in &location.connections {
            if !is_location(&conn.target) {
                return Err(CoreError::InvalidReference {
                    from: location.id.clone(),
                    target: conn.target.clone(),
                    expected: "location",
                });
            }
        }
    }

    for character in &document.characters {
        if let Some(loc) = character.location.as_deref().filter(|l| !l.is_empty())
            && !is_location(loc)
        {
            return Err(CoreError::InvalidReference {
                from: character.id.clone(),
                target: loc.to_string(),
                expected: "location",
            });
        }
    }

    for item in &document.items {
        if let Some(owner) = item.owner.as_deref().filter(|o| !o.is_empty())
            && !is_location(owner)
            && !is_character(owner)
        {
            return Err(CoreError::InvalidReference {
                from: item.id.clone(),
                target: owner.to_string(),
                expected: "location or character",
            });
        }
    }

    Ok(())
}
