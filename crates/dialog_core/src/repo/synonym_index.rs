//! Synonym ownership index.
//!
//! # Responsibility
//! - Map each synonym phrase to the one prompt that owns it.
//! - Answer inverse queries (all synonyms of a prompt).
//!
//! # Invariants
//! - A synonym has at most one owner; `put` never silently steals ownership.
//! - `remove` only deletes a pairing that currently holds.

use crate::model::dialog::{Prompt, Synonym};
use crate::repo::{IndexError, IndexResult};
use std::collections::{BTreeMap, BTreeSet};

/// Ordered synonym -> prompt map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymIndex {
    owners: BTreeMap<Synonym, Prompt>,
}

impl SynonymIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `synonym -> prompt`.
    ///
    /// Re-inserting an existing pairing is a no-op.
    ///
    /// # Errors
    /// - `IndexError::Conflict` when `synonym` is owned by a different prompt.
    pub fn put(&mut self, synonym: impl Into<Synonym>, prompt: impl Into<Prompt>) -> IndexResult<()> {
        let synonym = synonym.into();
        let prompt = prompt.into();
        if let Some(owner) = self.owners.get(&synonym) {
            if *owner != prompt {
                return Err(IndexError::Conflict {
                    synonym,
                    owner: owner.clone(),
                });
            }
        }
        self.owners.insert(synonym, prompt);
        Ok(())
    }

    /// Returns the owning prompt of `synonym`.
    pub fn get(&self, synonym: &str) -> Option<&str> {
        self.owners.get(synonym).map(String::as_str)
    }

    pub fn contains(&self, synonym: &str) -> bool {
        self.owners.contains_key(synonym)
    }

    /// Deletes `synonym` if and only if it is owned by `expected_prompt`.
    ///
    /// # Errors
    /// - `IndexError::NotFound` when `synonym` is unknown.
    /// - `IndexError::Mismatch` when another prompt owns `synonym`.
    pub fn remove(&mut self, synonym: &str, expected_prompt: &str) -> IndexResult<()> {
        match self.owners.get(synonym) {
            None => Err(IndexError::NotFound(synonym.to_string())),
            Some(owner) if owner != expected_prompt => Err(IndexError::Mismatch {
                synonym: synonym.to_string(),
                expected: expected_prompt.to_string(),
                actual: owner.clone(),
            }),
            Some(_) => {
                self.owners.remove(synonym);
                Ok(())
            }
        }
    }

    /// Moves `synonym` from `from` to `to`.
    ///
    /// # Errors
    /// - `IndexError::NotFound` when `synonym` is unknown.
    /// - `IndexError::Mismatch` when `synonym` is not owned by `from`.
    pub fn repoint(&mut self, synonym: &str, from: &str, to: impl Into<Prompt>) -> IndexResult<()> {
        match self.owners.get_mut(synonym) {
            None => Err(IndexError::NotFound(synonym.to_string())),
            Some(owner) if owner.as_str() != from => Err(IndexError::Mismatch {
                synonym: synonym.to_string(),
                expected: from.to_string(),
                actual: owner.clone(),
            }),
            Some(owner) => {
                *owner = to.into();
                Ok(())
            }
        }
    }

    /// Returns every synonym currently pointing at `prompt`.
    pub fn owners_of(&self, prompt: &str) -> BTreeSet<Synonym> {
        self.owners
            .iter()
            .filter(|(_, owner)| owner.as_str() == prompt)
            .map(|(synonym, _)| synonym.clone())
            .collect()
    }

    /// Groups synonyms by owning prompt (inverse view of the index).
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (synonym, prompt) in &self.owners {
            groups
                .entry(prompt.as_str())
                .or_default()
                .push(synonym.as_str());
        }
        groups
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.owners
            .iter()
            .map(|(synonym, prompt)| (synonym.as_str(), prompt.as_str()))
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::SynonymIndex;
    use crate::repo::IndexError;

    #[test]
    fn put_rejects_foreign_owner_and_accepts_same_owner() {
        let mut index = SynonymIndex::new();
        index.put("hi", "greeting").unwrap();
        index.put("hi", "greeting").unwrap();

        let err = index.put("hi", "farewell").unwrap_err();
        assert!(matches!(
            err,
            IndexError::Conflict { ref synonym, ref owner } if synonym == "hi" && owner == "greeting"
        ));
        assert_eq!(index.get("hi"), Some("greeting"));
    }

    #[test]
    fn remove_requires_matching_owner() {
        let mut index = SynonymIndex::new();
        index.put("hi", "greeting").unwrap();

        let err = index.remove("hi", "farewell").unwrap_err();
        assert!(matches!(err, IndexError::Mismatch { .. }));
        assert!(index.contains("hi"));

        index.remove("hi", "greeting").unwrap();
        assert!(matches!(
            index.remove("hi", "greeting").unwrap_err(),
            IndexError::NotFound(_)
        ));
    }

    #[test]
    fn repoint_checks_current_owner() {
        let mut index = SynonymIndex::new();
        index.put("hi", "greeting").unwrap();

        assert!(matches!(
            index.repoint("hi", "farewell", "salutation").unwrap_err(),
            IndexError::Mismatch { .. }
        ));
        index.repoint("hi", "greeting", "salutation").unwrap();
        assert_eq!(index.get("hi"), Some("salutation"));
    }

    #[test]
    fn owners_of_and_grouped_are_inverse_views() {
        let mut index = SynonymIndex::new();
        index.put("hi", "greeting").unwrap();
        index.put("hello", "greeting").unwrap();
        index.put("cya", "bye").unwrap();

        let owned: Vec<_> = index.owners_of("greeting").into_iter().collect();
        assert_eq!(owned, vec!["hello".to_string(), "hi".to_string()]);
        assert!(index.owners_of("missing").is_empty());

        let groups = index.grouped();
        assert_eq!(groups.get("greeting"), Some(&vec!["hello", "hi"]));
        assert_eq!(groups.get("bye"), Some(&vec!["cya"]));
    }
}
