//! Prompt -> response catalog.
//!
//! # Responsibility
//! - Own the `ResponseEntry` for each canonical prompt.
//!
//! # Invariants
//! - Prompts are unique keys.
//! - `rename` moves an entry without merging; an existing target is replaced.

use crate::model::dialog::{Prompt, ResponseEntry};
use crate::repo::{IndexError, IndexResult};
use std::collections::BTreeMap;

/// Ordered prompt -> entry map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseCatalog {
    entries: BTreeMap<Prompt, ResponseEntry>,
}

impl ResponseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `prompt`, returning the previous one.
    pub fn put(&mut self, prompt: impl Into<Prompt>, entry: ResponseEntry) -> Option<ResponseEntry> {
        self.entries.insert(prompt.into(), entry)
    }

    pub fn get(&self, prompt: &str) -> Option<&ResponseEntry> {
        self.entries.get(prompt)
    }

    pub fn get_mut(&mut self, prompt: &str) -> Option<&mut ResponseEntry> {
        self.entries.get_mut(prompt)
    }

    pub fn contains(&self, prompt: &str) -> bool {
        self.entries.contains_key(prompt)
    }

    pub fn remove(&mut self, prompt: &str) -> Option<ResponseEntry> {
        self.entries.remove(prompt)
    }

    /// Moves the entry stored under `old` to `new`.
    ///
    /// # Errors
    /// - `IndexError::NotFound` when `old` has no entry.
    pub fn rename(&mut self, old: &str, new: impl Into<Prompt>) -> IndexResult<()> {
        let entry = self
            .entries
            .remove(old)
            .ok_or_else(|| IndexError::NotFound(old.to_string()))?;
        self.entries.insert(new.into(), entry);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResponseEntry)> {
        self.entries
            .iter()
            .map(|(prompt, entry)| (prompt.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
