//! Narration: picking the active text of a description list, and rendering
//! the affordance sections.

pub mod affordances;

use tw_core::{Description, World};
use tw_script::{Condition, ScriptResult};

use crate::config::EngineConfig;
use crate::effects;

/// Resolve the active text of a description list.
///
/// The first entry with a `default` is the base text. The first conditional
/// entry whose condition holds is appended to it; later matches are ignored.
pub fn describe(descriptions: &[Description], world: &World) -> ScriptResult<String> {
    let base = descriptions
        .iter()
        .find_map(|d| d.default.as_deref())
        .unwrap_or_default();

    for entry in descriptions {
        let Some(condition) = effects::authored(entry.condition.as_deref()) else {
            continue;
        };
        if Condition::parse(condition)?.evaluate(world)? {
            let extra = entry.description.as_deref().unwrap_or_default();
            return Ok(format!("{base}{extra}"));
        }
    }
    Ok(base.to_string())
}

/// Whether the end-of-game flag is set.
pub fn is_ended(world: &World, config: &EngineConfig) -> bool {
    world
        .variable(&config.end_flag)
        .is_some_and(|v| v.value.is_truthy())
}

/// Narrate the ending named by the end-id variable, falling back to the
/// configured closing line when it names nothing.
pub fn ending(world: &World, config: &EngineConfig) -> ScriptResult<String> {
    let chosen = world
        .variable(&config.end_id)
        .map(|v| v.value.to_string())
        .and_then(|id| world.ending(&id));
    match chosen {
        Some(ending) => describe(&ending.descriptions, world),
        None => Ok(crate::output::paragraph(&crate::output::escape(
            &config.messages.the_end,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::Value;

    fn world() -> World {
        World::from_json(
            r#"{
                "locations": [{"id": "room", "name": "Room"}],
                "items": [{"id": "key", "name": "Key", "owner": "room"}],
                "characters": [{"id": "player", "name": "Venda", "location": "room"}],
                "endings": [{"id": "end1", "descriptions": [{"default": "game ending 1"}]}],
                "variables": [{"id": "light", "value": false}]
            }"#,
        )
        .unwrap()
    }

    fn descriptions() -> Vec<Description> {
        vec![
            Description::when("light", "<p>It is bright.</p>"),
            Description::base("<p>Default room</p>"),
            Description::when("key:owner = room", "<p>Key is here</p>"),
            Description::when("key:visible", "<p>Never shown</p>"),
        ]
    }

    #[test]
    fn base_plus_first_matching_condition() {
        let w = world();
        assert_eq!(
            describe(&descriptions(), &w).unwrap(),
            "<p>Default room</p><p>Key is here</p>"
        );
    }

    #[test]
    fn earlier_condition_wins() {
        let mut w = world();
        w.set_value("light", Value::Bool(true)).unwrap();
        assert_eq!(
            describe(&descriptions(), &w).unwrap(),
            "<p>Default room</p><p>It is bright.</p>"
        );
    }

    #[test]
    fn no_match_falls_back_to_base() {
        let mut w = world();
        w.set_value("key:owner", Value::text("player")).unwrap();
        w.set_value("key:visible", Value::Bool(false)).unwrap();
        assert_eq!(describe(&descriptions(), &w).unwrap(), "<p>Default room</p>");
        assert_eq!(describe(&[], &w).unwrap(), "");
    }

    #[test]
    fn blank_condition_is_skipped() {
        let w = world();
        let list = vec![
            Description::base("<p>Default room</p>"),
            Description::when("", "<p>Never shown</p>"),
        ];
        assert_eq!(describe(&list, &w).unwrap(), "<p>Default room</p>");
    }

    #[test]
    fn condition_errors_propagate() {
        let w = world();
        let broken = vec![Description::when("missing_flag", "x")];
        assert!(describe(&broken, &w).is_err());
    }

    #[test]
    fn ending_lookup() {
        let mut w = world();
        let config = EngineConfig::default();
        assert!(!is_ended(&w, &config));
        w.set_value("game_end_id", Value::text("end1")).unwrap();
        w.set_value("game_end", Value::Bool(true)).unwrap();
        assert!(is_ended(&w, &config));
        assert_eq!(ending(&w, &config).unwrap(), "game ending 1");
    }

    #[test]
    fn unknown_ending_uses_closing_line() {
        let w = world();
        assert_eq!(
            ending(&w, &EngineConfig::default()).unwrap(),
            "<p>The End.</p>"
        );
    }
}
