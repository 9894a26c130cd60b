//! Active dialogue threads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which entry each character is paused at, awaiting a response.
///
/// A character is either idle (absent) or has exactly one active entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialogueState {
    threads: BTreeMap<String, String>,
}

impl DialogueState {
    /// Create a state with no active threads.
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry a character is paused at.
    pub fn active(&self, character: &str) -> Option<&str> {
        self.threads.get(character).map(String::as_str)
    }

    /// Pause a character at an entry, replacing any earlier thread.
    pub fn begin(&mut self, character: impl Into<String>, entry: impl Into<String>) {
        self.threads.insert(character.into(), entry.into());
    }

    /// Return a character to idle.
    pub fn end(&mut self, character: &str) {
        self.threads.remove(character);
    }

    /// Whether no character has an active thread.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Number of active threads.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.threads.len()
    }

    /// Drop threads for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.threads.retain(|c, e| keep(c, e));
    }
}
