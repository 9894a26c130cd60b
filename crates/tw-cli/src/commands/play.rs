//! Interactive play on stdin/stdout.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use tracing::debug;
use tw_fiction::{Action, FictionSession, SavedGame, Verb};

use crate::render::Renderer;

pub fn run(
    file: &Path,
    config: Option<&Path>,
    save: Option<&Path>,
    resume: bool,
) -> Result<(), String> {
    let config = super::load_config(config)?;

    let (mut session, opening) = if resume {
        let path = save.ok_or("--resume needs --save")?;
        let saved = SavedGame::from_json(&super::read(path)?)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        let mut session = FictionSession::resume(saved, config)
            .map_err(|e| format!("failed to resume game: {e}"))?;
        let opening = session.handle(Action::new(Verb::Look, ""));
        (session, opening)
    } else {
        let mut session = FictionSession::new(super::load_world(file)?, config);
        let opening = session.start();
        (session, opening)
    };

    let mut renderer = Renderer::new();
    let opening = opening.map_err(|e| format!("failed to start game: {e}"))?;
    print!("{}", renderer.render(&opening));
    println!("  Type a command or a link number; 'save' and 'quit' also work.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    while !session.is_ended() {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
            break;
        }
        if input.eq_ignore_ascii_case("save") {
            match save {
                Some(path) => {
                    write_save(&session, path)?;
                    println!("  Saved to {}.\n", path.display());
                }
                None => println!("{}\n", "No save file given (use --save).".yellow()),
            }
            continue;
        }

        let action = match input.parse::<usize>() {
            Ok(n) => match renderer.link(n) {
                Some(action) => action,
                None => {
                    println!("{}\n", format!("There is no link [{n}].").yellow());
                    continue;
                }
            },
            Err(_) => Action::parse(input),
        };

        match session.handle(action) {
            Ok(outputs) => print!("{}", renderer.render(&outputs)),
            Err(e) => println!("{}\n", e.to_string().yellow()),
        }
    }

    Ok(())
}

fn write_save(session: &FictionSession, path: &Path) -> Result<(), String> {
    let json = session.save().to_json().map_err(|e| e.to_string())?;
    fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    debug!(path = %path.display(), "game saved");
    Ok(())
}
