//! Effect rules: `{condition?, description?, set?}` attached to item events.

use tw_core::{EffectRule, World};
use tw_script::{Condition, ScriptResult, SetStatement};

/// An authored script, or `None` when it is absent or blank.
pub fn authored(script: Option<&str>) -> Option<&str> {
    script.filter(|s| !s.trim().is_empty())
}

/// Whether an optional guard holds. An absent or blank guard always holds.
pub fn holds(condition: Option<&str>, world: &World) -> ScriptResult<bool> {
    match authored(condition) {
        None => Ok(true),
        Some(source) => Condition::parse(source)?.evaluate(world),
    }
}

/// Apply an optional `set` statement. A blank one does nothing.
pub fn apply(set: Option<&str>, world: &mut World) -> ScriptResult<()> {
    match authored(set) {
        None => Ok(()),
        Some(source) => SetStatement::parse(source)?.apply(world),
    }
}

fn fire(rule: &EffectRule, world: &mut World) -> ScriptResult<Option<String>> {
    apply(rule.set.as_deref(), world)?;
    Ok(rule.description.clone().filter(|d| !d.is_empty()))
}

/// Run every rule whose guard holds, in order. Each guard is checked after
/// the previous rule's `set` has been applied. Returns the narrations.
pub fn run_all(rules: &[EffectRule], world: &mut World) -> ScriptResult<Vec<String>> {
    let mut narration = Vec::new();
    for rule in rules {
        if holds(rule.condition.as_deref(), world)? {
            narration.extend(fire(rule, world)?);
        }
    }
    Ok(narration)
}

/// Run the first rule whose guard holds. `None` when no rule fired;
/// otherwise the rule's narration, which may itself be absent.
pub fn run_first(rules: &[EffectRule], world: &mut World) -> ScriptResult<Option<Option<String>>> {
    for rule in rules {
        if holds(rule.condition.as_deref(), world)? {
            return fire(rule, world).map(Some);
        }
    }
    Ok(None)
}
