//! Static check of every condition and `set` statement in a world.

use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;

use tw_core::{Description, DialogueEntry, EffectRule, World};
use tw_script::{Condition, Diagnostic, SetStatement, Severity, render_diagnostics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Condition,
    Set,
}

/// One script found in the document, named by where it lives.
struct Script {
    origin: String,
    kind: Kind,
    source: String,
}

pub fn run(file: &Path) -> Result<(), String> {
    let world = super::load_world(file)?;
    let scripts = collect(&world);

    let statements: Vec<SetStatement> = scripts
        .iter()
        .filter(|s| s.kind == Kind::Set)
        .filter_map(|s| SetStatement::parse(&s.source).ok())
        .collect();
    // Names a condition may read: every entity, plus variables some `set`
    // creates on the fly.
    let mut known: HashSet<&str> = world
        .locations()
        .map(|e| e.id.as_str())
        .chain(world.items().map(|e| e.id.as_str()))
        .chain(world.characters().map(|e| e.id.as_str()))
        .chain(world.endings().map(|e| e.id.as_str()))
        .chain(world.variables().map(|e| e.id.as_str()))
        .collect();
    for statement in &statements {
        known.extend(statement.clauses().iter().map(|c| root(&c.target)));
    }

    let mut errors = 0;
    let mut warnings = 0;
    for script in &scripts {
        let diagnostics = diagnose(script, &known);
        if diagnostics.is_empty() {
            continue;
        }
        errors += count(&diagnostics, Severity::Error);
        warnings += count(&diagnostics, Severity::Warning);
        eprint!(
            "{}",
            render_diagnostics(&script.source, &script.origin, &diagnostics)
        );
    }

    for warning in dangling_responses(&world) {
        eprintln!("warning: {warning}");
        warnings += 1;
    }

    if errors > 0 {
        eprintln!(
            "  {} error{}, {} warning{}",
            errors,
            plural(errors),
            warnings,
            plural(warnings),
        );
        return Err(format!("check failed with {errors} error{}", plural(errors)));
    }
    if warnings > 0 {
        eprintln!("  {} warning{}", warnings, plural(warnings));
    }

    let title = if world.metadata.title.is_empty() {
        file.display().to_string()
    } else {
        world.metadata.title.clone()
    };
    println!("  All checks passed for '{title}'.");
    println!(
        "  {} scripts in {} locations, {} items, {} characters",
        scripts.len(),
        world.locations().count(),
        world.items().count(),
        world.characters().count(),
    );
    Ok(())
}

fn diagnose(script: &Script, known: &HashSet<&str>) -> Vec<Diagnostic> {
    match script.kind {
        Kind::Condition => match Condition::parse(&script.source) {
            Ok(condition) => condition
                .atoms()
                .filter(|atom| !known.contains(root(&atom.path)))
                .map(|atom| {
                    Diagnostic::warning(
                        atom.span.clone(),
                        format!("`{}` is not an entity or variable", root(&atom.path)),
                    )
                    .with_label("unknown name")
                })
                .collect(),
            Err(e) => vec![Diagnostic::from_script_error(&script.source, &e)],
        },
        Kind::Set => match SetStatement::parse(&script.source) {
            Ok(statement) => unresolved_operands(&script.source, &statement, known),
            Err(e) => vec![Diagnostic::from_script_error(&script.source, &e)],
        },
    }
}

/// Unknown names inside larger expressions. A bare unknown name is stored as
/// text, but as an operand it reads as 0.
fn unresolved_operands(
    source: &str,
    statement: &SetStatement,
    known: &HashSet<&str>,
) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    for clause in statement.clauses() {
        if clause.expression.is_bare_identifier() {
            continue;
        }
        for (path, span) in clause.expression.identifiers() {
            if known.contains(root(path)) {
                continue;
            }
            let diagnostic = match hyphenated(source, span, known) {
                Some(id) => Diagnostic::warning(
                    span.start..span.start + id.len(),
                    format!("`{id}` reads as a subtraction; quote it to name the id"),
                )
                .with_label("quote this"),
                None => Diagnostic::warning(
                    span.clone(),
                    format!("`{}` is not an entity or variable; it reads as 0", root(path)),
                )
                .with_label("unknown name"),
            };
            found.push(diagnostic);
        }
    }
    found
}

/// The known id spelled by the name at `span` joined with the `-` and word
/// that follow it, as in `end-1`.
fn hyphenated<'a>(source: &'a str, span: &Range<usize>, known: &HashSet<&str>) -> Option<&'a str> {
    let rest = source.get(span.end..)?.strip_prefix('-')?;
    let len = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    let id = source.get(span.start..span.end + 1 + len)?;
    known.contains(id).then_some(id)
}

fn root(path: &str) -> &str {
    path.split(':').next().unwrap_or_default().trim()
}

fn count(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

fn collect(world: &World) -> Vec<Script> {
    let mut scripts = Vec::new();
    for location in world.locations() {
        descriptions(&mut scripts, &format!("location {}", location.id), &location.descriptions);
    }
    for item in world.items() {
        let origin = format!("item {}", item.id);
        descriptions(&mut scripts, &origin, &item.descriptions);
        rules(&mut scripts, &origin, "onTake", &item.on_take);
        rules(&mut scripts, &origin, "onDrop", &item.on_drop);
        rules(&mut scripts, &origin, "onUse", &item.on_use);
        rules(&mut scripts, &origin, "onSee", &item.on_see);
    }
    for character in world.characters() {
        let origin = format!("character {}", character.id);
        descriptions(&mut scripts, &origin, &character.descriptions);
        dialogue(&mut scripts, &origin, &character.on_talk);
    }
    for ending in world.endings() {
        descriptions(&mut scripts, &format!("ending {}", ending.id), &ending.descriptions);
    }
    scripts
}

fn push(scripts: &mut Vec<Script>, origin: String, kind: Kind, source: Option<&str>) {
    if let Some(source) = source.filter(|s| !s.trim().is_empty()) {
        scripts.push(Script {
            origin,
            kind,
            source: source.to_string(),
        });
    }
}

fn descriptions(scripts: &mut Vec<Script>, origin: &str, list: &[Description]) {
    for (i, d) in list.iter().enumerate() {
        let origin = format!("{origin} descriptions[{i}]");
        push(scripts, origin, Kind::Condition, d.condition.as_deref());
    }
}

fn rules(scripts: &mut Vec<Script>, origin: &str, event: &str, list: &[EffectRule]) {
    for (i, rule) in list.iter().enumerate() {
        let origin = format!("{origin} {event}[{i}]");
        push(scripts, format!("{origin} condition"), Kind::Condition, rule.condition.as_deref());
        push(scripts, format!("{origin} set"), Kind::Set, rule.set.as_deref());
    }
}

fn dialogue(scripts: &mut Vec<Script>, origin: &str, entries: &[DialogueEntry]) {
    for (i, entry) in entries.iter().enumerate() {
        let origin = format!("{origin} onTalk[{i}]");
        push(scripts, format!("{origin} condition"), Kind::Condition, entry.condition.as_deref());
        push(scripts, format!("{origin} set"), Kind::Set, entry.set.as_deref());
        for response in &entry.responses {
            let origin = format!("{origin} response {}", response.id);
            push(scripts, format!("{origin} condition"), Kind::Condition, response.condition.as_deref());
            push(scripts, format!("{origin} set"), Kind::Set, response.set.as_deref());
        }
    }
}

/// Responses whose `next` names no entry of the same character.
fn dangling_responses(world: &World) -> Vec<String> {
    let mut found = Vec::new();
    for character in world.characters() {
        for entry in &character.on_talk {
            for response in &entry.responses {
                if let Some(next) = response.next.as_deref()
                    && character.entry(next).is_none()
                {
                    found.push(format!(
                        "character {}: response `{}` leads to missing entry `{next}`",
                        character.id, response.id
                    ));
                }
            }
        }
    }
    found
}
