pub mod check;
pub mod play;

use std::fs;
use std::path::Path;

use tw_core::World;
use tw_fiction::EngineConfig;

/// Read a file, naming it in the error.
fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

/// Load and validate a world document.
fn load_world(path: &Path) -> Result<World, String> {
    World::from_json(&read(path)?).map_err(|e| format!("{}: {e}", path.display()))
}

/// Load an engine configuration override, or the defaults.
fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    match path {
        None => Ok(EngineConfig::default()),
        Some(path) => EngineConfig::from_json(&read(path)?)
            .map_err(|e| format!("{}: {e}", path.display())),
    }
}
