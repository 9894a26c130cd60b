//! Integration tests for the tw CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const WORLD: &str = r#"{
    "metadata": {"title": "Čajová záhada"},
    "intro": [{"page": "<p>Grandma is waiting.</p>"}],
    "locations": [
        {
            "id": "kuchyně", "name": "Kuchyně",
            "descriptions": [
                {"default": "<p>A small kitchen.</p>"},
                {"condition": "plný_šálek", "description": "<p>Tea is steaming.</p>"}
            ],
            "connections": [{"direction": "Předsíň", "target": "předsíň"}]
        },
        {
            "id": "předsíň", "name": "Předsíň",
            "descriptions": [{"default": "<p>A dark hall.</p>"}],
            "connections": [{"direction": "Kuchyně", "target": "kuchyně"}]
        }
    ],
    "items": [
        {"id": "lžička", "name": "Lžička", "owner": "kuchyně"},
        {
            "id": "dveře", "name": "Dveře", "owner": "předsíň", "movable": "false",
            "onUse": [{"description": "<p>You leave.</p>", "set": "game_end = true; game_end_id = 'end1'"}]
        }
    ],
    "characters": [
        {"id": "player", "name": "Venda", "location": "kuchyně"},
        {
            "id": "babička", "name": "Babička", "location": "kuchyně",
            "onTalk": [
                {
                    "id": "greet",
                    "description": "<p>Hello dear.</p>",
                    "responses": [{"id": "bye", "text": "Bye"}]
                }
            ]
        }
    ],
    "endings": [{"id": "end1", "descriptions": [{"default": "<p>You walked out.</p>"}]}],
    "variables": [{"id": "plný_šálek", "value": true}]
}"#;

/// Create a temp directory holding `world.json`.
fn test_world(json: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("world.json");
    fs::write(&path, json).unwrap();
    (dir, path)
}

fn tw() -> Command {
    Command::cargo_bin("tw").unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_valid_world() {
    let (_dir, path) = test_world(WORLD);
    tw().args(["check", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("All checks passed for 'Čajová záhada'")
                .and(predicate::str::contains("2 locations")),
        );
}

#[test]
fn check_reports_syntax_errors() {
    let broken = WORLD.replace(r#""condition": "plný_šálek""#, r#""condition": "(plný_šálek""#);
    let (_dir, path) = test_world(&broken);
    tw().args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("unclosed")
                .and(predicate::str::contains("location kuchyně descriptions[1]"))
                .and(predicate::str::contains("error: check failed with 1 error")),
        );
}

#[test]
fn check_warns_about_unknown_names() {
    let typo = WORLD.replace(r#""condition": "plný_šálek""#, r#""condition": "plny_salek""#);
    let (_dir, path) = test_world(&typo);
    tw().args(["check", path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("`plny_salek` is not an entity or variable"));
}

#[test]
fn check_warns_about_hyphenated_ids_read_as_subtraction() {
    let world = WORLD
        .replace("'end1'", "end-1")
        .replace(r#""id": "end1""#, r#""id": "end-1""#);
    let (_dir, path) = test_world(&world);
    tw().args(["check", path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("`end-1` reads as a subtraction"));
}

#[test]
fn check_warns_about_unknown_operands() {
    let world = WORLD.replace("'end1'", "'end' + suffix");
    let (_dir, path) = test_world(&world);
    tw().args(["check", path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "`suffix` is not an entity or variable; it reads as 0",
        ));
}

#[test]
fn check_rejects_duplicate_ids() {
    let duplicate = WORLD.replace(r#""id": "lžička""#, r#""id": "kuchyně""#);
    let (_dir, path) = test_world(&duplicate);
    tw().args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn check_missing_file() {
    tw().args(["check", "/nonexistent/world.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_shows_opening() {
    let (_dir, path) = test_world(WORLD);
    tw().args(["play", path.to_str().unwrap()])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Čajová záhada")
                .and(predicate::str::contains("Grandma is waiting."))
                .and(predicate::str::contains("A small kitchen."))
                .and(predicate::str::contains("Tea is steaming."))
                .and(predicate::str::contains("Babička")),
        );
}

#[test]
fn play_runs_typed_commands() {
    let (_dir, path) = test_world(WORLD);
    tw().args(["play", path.to_str().unwrap()])
        .write_stdin("take lžička\ninventory\ndance\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("You take Lžička.")
                .and(predicate::str::contains("You are carrying: Lžička."))
                .and(predicate::str::contains("Unknown command: dance.")),
        );
}

#[test]
fn play_follows_link_numbers() {
    let (_dir, path) = test_world(WORLD);
    // Link 1 of the opening is the first person present.
    tw().args(["play", path.to_str().unwrap()])
        .write_stdin("1\n1\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Hello dear.")
                .and(predicate::str::contains("[1] Bye"))
                .and(predicate::str::contains("Bye")),
        );
}

#[test]
fn play_reports_missing_link() {
    let (_dir, path) = test_world(WORLD);
    tw().args(["play", path.to_str().unwrap()])
        .write_stdin("99\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("There is no link [99]."));
}

#[test]
fn play_ends_with_ending() {
    let (_dir, path) = test_world(WORLD);
    tw().args(["play", path.to_str().unwrap()])
        .write_stdin("go předsíň\nuse dveře\nlook\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("You leave.")
                .and(predicate::str::contains("You walked out.")),
        );
}

#[test]
fn play_save_and_resume() {
    let (dir, path) = test_world(WORLD);
    let save = dir.path().join("save.json");

    tw().args(["play", path.to_str().unwrap(), "--save", save.to_str().unwrap()])
        .write_stdin("take lžička\nsave\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to"));
    assert!(save.exists());

    tw().args([
        "play",
        path.to_str().unwrap(),
        "--save",
        save.to_str().unwrap(),
        "--resume",
    ])
    .write_stdin("inventory\nquit\n")
    .assert()
    .success()
    .stdout(
        predicate::str::contains("You are carrying: Lžička.")
            .and(predicate::str::contains("Grandma is waiting.").not()),
    );
}

#[test]
fn play_resume_requires_save() {
    let (_dir, path) = test_world(WORLD);
    tw().args(["play", path.to_str().unwrap(), "--resume"])
        .assert()
        .failure();
}

#[test]
fn play_uses_config_override() {
    let (dir, path) = test_world(WORLD);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"messages": {"unknownCommand": "Nerozumím: {name}."}}"#).unwrap();

    tw().args(["play", path.to_str().unwrap(), "--config", config.to_str().unwrap()])
        .write_stdin("tancuj\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nerozumím: tancuj."));
}

#[test]
fn play_invalid_world() {
    let (_dir, path) = test_world("{ not json");
    tw().args(["play", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}
