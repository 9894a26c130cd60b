//! The sections listing what the player can do next.

use tw_core::{Item, World};

use super::describe;
use crate::config::EngineConfig;
use crate::error::{FictionError, FictionResult};
use crate::output::{Output, Section, action_link, escape, list};

/// Whether the player can reach an item: held, or lying visibly in `location`.
pub fn is_reachable(item: &Item, location: &str) -> bool {
    item.is_held() || (item.visible && item.is_at(location))
}

/// Whether a section is switched off by its `<id><suffix>` variable.
fn is_hidden(world: &World, config: &EngineConfig, section: Section) -> bool {
    world
        .variable(&format!("{}{}", section.id(), config.show_suffix))
        .is_some_and(|v| !v.value.is_truthy())
}

/// Render every affordance section for the player's current location.
pub fn render(world: &World, config: &EngineConfig) -> FictionResult<Vec<Output>> {
    let location = world
        .player_location()
        .ok_or(FictionError::PlayerNotPlaced)?;
    let here = location.id.as_str();

    let item_links = |action: &str, keep: &dyn Fn(&Item) -> bool| -> String {
        let links: Vec<String> = world
            .items()
            .filter(|i| keep(i))
            .map(|i| action_link(action, &i.id, &i.name))
            .collect();
        list(&links)
    };

    let mut outputs = Vec::with_capacity(Section::AFFORDANCES.len());
    for section in Section::AFFORDANCES {
        let html = if is_hidden(world, config, section) {
            String::new()
        } else {
            match section {
                Section::Location => format!(
                    "<h2>{}</h2>{}",
                    escape(&location.name),
                    describe(&location.descriptions, world)?
                ),
                Section::Characters => {
                    let links: Vec<String> = world
                        .characters_at(here)
                        .filter(|c| c.visible)
                        .map(|c| action_link("talk", &c.id, &c.name))
                        .collect();
                    list(&links)
                }
                Section::Items => item_links("see", &|i: &Item| i.visible && i.is_at(here)),
                Section::Take => item_links("take", &|i: &Item| {
                    i.visible && i.movable && i.is_at(here)
                }),
                Section::Drop => item_links("drop", &|i: &Item| i.is_held()),
                Section::Use => {
                    item_links("use", &|i: &Item| !i.on_use.is_empty() && is_reachable(i, here))
                }
                Section::Go => {
                    let links: Vec<String> = location
                        .connections
                        .iter()
                        .map(|c| action_link("go", &c.direction, &c.direction))
                        .collect();
                    list(&links)
                }
                Section::Title => continue,
            }
        };
        outputs.push(Output::replace(section, html));
    }
    Ok(outputs)
}

/// Blank every affordance section.
pub fn clear() -> Vec<Output> {
    Section::AFFORDANCES
        .iter()
        .map(|&section| Output::replace(section, ""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::Value;

    fn world() -> World {
        World::from_json(
            r#"{
                "locations": [
                    {
                        "id": "kuchyně", "name": "Kuchyně",
                        "descriptions": [{"default": "<p>Kitchen.</p>"}],
                        "connections": [{"direction": "Předsíň", "target": "předsíň"}]
                    },
                    {"id": "předsíň", "name": "Předsíň"}
                ],
                "items": [
                    {"id": "šálek", "name": "Šálek", "owner": "kuchyně",
                     "onUse": [{"description": "<p>Sip.</p>"}]},
                    {"id": "stůl", "name": "Stůl", "owner": "kuchyně", "movable": "false"},
                    {"id": "klíče", "name": "Klíče", "owner": "kuchyně", "visible": "false"},
                    {"id": "mince", "name": "Mince", "owner": "player"}
                ],
                "characters": [
                    {"id": "player", "name": "Venda", "location": "kuchyně"},
                    {"id": "babička", "name": "Babička", "location": "kuchyně"}
                ]
            }"#,
        )
        .unwrap()
    }

    fn section(outputs: &[Output], section: Section) -> &str {
        &outputs
            .iter()
            .find(|o| o.section == Some(section))
            .unwrap()
            .text
    }

    #[test]
    fn renders_every_affordance() {
        let w = world();
        let out = render(&w, &EngineConfig::default()).unwrap();
        assert_eq!(out.len(), 7);

        assert_eq!(section(&out, Section::Location), "<h2>Kuchyně</h2><p>Kitchen.</p>");
        assert!(section(&out, Section::Characters).contains(r#"data-param="babička""#));
        assert!(!section(&out, Section::Characters).contains("Venda"));

        let items = section(&out, Section::Items);
        assert!(items.contains("Šálek") && items.contains("Stůl"));
        assert!(!items.contains("Klíče"));

        let take = section(&out, Section::Take);
        assert!(take.contains("Šálek") && !take.contains("Stůl"));

        assert!(section(&out, Section::Drop).contains("Mince"));
        assert!(section(&out, Section::Use).contains(r#"data-action="use""#));
        assert!(section(&out, Section::Go).contains(r#"data-param="Předsíň""#));
    }

    #[test]
    fn show_variable_hides_section() {
        let mut w = world();
        w.set_value("game-items-show", Value::Bool(false)).unwrap();
        let out = render(&w, &EngineConfig::default()).unwrap();
        assert_eq!(section(&out, Section::Items), "");
        assert!(!section(&out, Section::Take).is_empty());

        w.set_value("game-items-show", Value::Bool(true)).unwrap();
        let out = render(&w, &EngineConfig::default()).unwrap();
        assert!(!section(&out, Section::Items).is_empty());
    }

    #[test]
    fn clear_blanks_all_sections() {
        let out = clear();
        assert_eq!(out.len(), 7);
        assert!(out.iter().all(|o| o.text.is_empty() && o.section.is_some()));
    }
}
