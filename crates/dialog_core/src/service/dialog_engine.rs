//! Dialog resolution engine.
//!
//! # Responsibility
//! - Resolve input phrases to responses through direct or synonym matches.
//! - Apply prompt/synonym/response mutations while keeping both maps
//!   consistent.
//! - Build from and flush back to row-oriented records.
//!
//! # Invariants
//! - Resolution is exact string equality; no normalization is applied.
//! - A direct prompt hit always wins over a synonym hit.
//! - Mutations never return `Err`; domain failures are `MutationOutcome`
//!   values, logged as `status=noop`, and leave state unchanged.
//! - No synonym ever has more than one owner.
//! - The engine holds no storage location; every flush names its target.

use crate::codec::{
    decode_response_records, decode_synonym_records, encode_response_entries,
    encode_synonym_groups, ResponseRecord, SynonymRecord,
};
use crate::model::dialog::{
    ActionId, AddPromptOutcome, MutationOutcome, Prompt, Resolution, ResponseEntry, Synonym,
};
use crate::repo::response_catalog::ResponseCatalog;
use crate::repo::synonym_index::SynonymIndex;
use crate::repo::IndexError;
use crate::store::{DialogStore, StoreResult};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read, Write};

/// Sole owner of the synonym index and response catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogEngine {
    synonyms: SynonymIndex,
    catalog: ResponseCatalog,
}

impl DialogEngine {
    /// Creates an engine with no prompts and no synonyms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an engine from decoded synonym and response records.
    ///
    /// A synonym listed for two different prompts keeps its first owner.
    /// A synonym whose text is itself a prompt is skipped, as in
    /// [`Self::add_synonym`]. Synonyms of prompts without a response are
    /// kept; they resolve to nothing until the prompt is added.
    pub fn from_records<S, R>(synonym_records: S, response_records: R) -> Self
    where
        S: IntoIterator<Item = SynonymRecord>,
        R: IntoIterator<Item = ResponseRecord>,
    {
        let mut engine = Self::new();

        for record in response_records {
            if engine.catalog.put(record.prompt, record.entry).is_some() {
                warn!("event=records_load module=dialog status=duplicate kind=response");
            }
        }

        let mut conflicts = 0usize;
        for record in synonym_records {
            for synonym in record.synonyms {
                if engine.catalog.contains(&synonym) {
                    conflicts += 1;
                    debug!(
                        "event=records_load module=dialog status=skipped reason=\"synonym is already a prompt\""
                    );
                    continue;
                }
                if let Err(err) = engine.synonyms.put(synonym, record.prompt.as_str()) {
                    conflicts += 1;
                    debug!("event=records_load module=dialog status=skipped detail={err}");
                }
            }
        }
        if conflicts > 0 {
            warn!(
                "event=records_load module=dialog status=conflict kind=synonym count={conflicts}"
            );
        }

        info!(
            "event=records_load module=dialog status=ok prompts={} synonyms={}",
            engine.catalog.len(),
            engine.synonyms.len()
        );
        engine
    }

    /// Reads both record streams fully and builds an engine from them.
    ///
    /// Malformed rows are skipped.
    ///
    /// # Errors
    /// - Returns read failures, including non UTF-8 input.
    pub fn from_readers<A, B>(mut synonym_source: A, mut response_source: B) -> io::Result<Self>
    where
        A: Read,
        B: Read,
    {
        let mut synonym_text = String::new();
        synonym_source.read_to_string(&mut synonym_text)?;
        let mut response_text = String::new();
        response_source.read_to_string(&mut response_text)?;

        Ok(Self::from_records(
            decode_synonym_records(&synonym_text),
            decode_response_records(&response_text),
        ))
    }

    /// Resolves `phrase` to a response.
    ///
    /// Looks up the catalog first, then the synonym index.
    pub fn resolve(&self, phrase: &str) -> Resolution<'_> {
        match self.prompt_for(phrase).and_then(|prompt| self.catalog.get(prompt)) {
            Some(entry) => Resolution::Known(entry),
            None => Resolution::Unknown,
        }
    }

    /// Returns the canonical prompt `phrase` resolves to, if it has an entry.
    pub fn prompt_for<'a>(&'a self, phrase: &'a str) -> Option<&'a str> {
        if self.catalog.contains(phrase) {
            return Some(phrase);
        }
        self.synonyms
            .get(phrase)
            .filter(|prompt| self.catalog.contains(prompt))
    }

    /// Adds a new prompt with its response, actions and synonyms.
    ///
    /// If `prompt` was a synonym of another prompt, that mapping is dropped.
    /// Each synonym is then attached through [`Self::add_synonym`].
    ///
    /// Outcomes: `Conflict` when `prompt` already has a response.
    pub fn add_prompt<A, S>(
        &mut self,
        prompt: impl Into<Prompt>,
        response: impl Into<String>,
        actions: A,
        synonyms: S,
    ) -> AddPromptOutcome
    where
        A: IntoIterator,
        A::Item: Into<ActionId>,
        S: IntoIterator,
        S::Item: Into<Synonym>,
    {
        let prompt = prompt.into();
        if self.catalog.contains(&prompt) {
            return AddPromptOutcome {
                prompt: report(
                    "prompt_add",
                    MutationOutcome::Conflict,
                    "prompt already associated, no action taken",
                ),
                synonyms: Vec::new(),
            };
        }

        self.release_synonym(&prompt);
        self.catalog
            .put(prompt.as_str(), ResponseEntry::new(response, actions));

        let synonyms = synonyms
            .into_iter()
            .map(|synonym| {
                let synonym: Synonym = synonym.into();
                let outcome = self.add_synonym(&prompt, &synonym);
                (synonym, outcome)
            })
            .collect();

        AddPromptOutcome {
            prompt: report("prompt_add", MutationOutcome::Ok, ""),
            synonyms,
        }
    }

    /// Renames `old_prompt` to `new_prompt`, carrying its synonyms along.
    ///
    /// An existing entry under `new_prompt` is replaced. If `new_prompt` was a
    /// synonym, that mapping is dropped so it can act as a plain prompt.
    ///
    /// Outcomes: `NotFound` when `old_prompt` has no response.
    pub fn update_prompt(&mut self, old_prompt: &str, new_prompt: &str) -> MutationOutcome {
        if !self.catalog.contains(old_prompt) {
            return report(
                "prompt_update",
                MutationOutcome::NotFound,
                "prompt does not exist",
            );
        }
        if old_prompt == new_prompt {
            return report("prompt_update", MutationOutcome::Ok, "");
        }

        self.release_synonym(new_prompt);
        if let Err(err) = self.catalog.rename(old_prompt, new_prompt) {
            return report_index_error("prompt_update", &err);
        }

        let carried: BTreeSet<Synonym> = self.synonyms.owners_of(old_prompt);
        for synonym in &carried {
            if let Err(err) = self.synonyms.repoint(synonym, old_prompt, new_prompt) {
                warn!("event=prompt_update module=dialog status=error detail={err}");
            }
        }
        debug!(
            "event=prompt_update module=dialog status=ok carried_synonyms={}",
            carried.len()
        );

        report("prompt_update", MutationOutcome::Ok, "")
    }

    /// Removes `prompt`, its response entry and every synonym it owns.
    ///
    /// Outcomes: `NotFound` when `prompt` has no response.
    pub fn remove_prompt(&mut self, prompt: &str) -> MutationOutcome {
        if !self.catalog.contains(prompt) {
            return report(
                "prompt_remove",
                MutationOutcome::NotFound,
                "prompt does not exist",
            );
        }

        let orphaned: BTreeSet<Synonym> = self.synonyms.owners_of(prompt);
        for synonym in &orphaned {
            if let Err(err) = self.synonyms.remove(synonym, prompt) {
                warn!("event=prompt_remove module=dialog status=error detail={err}");
            }
        }
        self.catalog.remove(prompt);

        report("prompt_remove", MutationOutcome::Ok, "")
    }

    /// Replaces the response text for a prompt or one of its synonyms.
    ///
    /// `new_actions` replaces the action list only when non-empty; an empty
    /// list keeps the current actions.
    ///
    /// Outcomes: `NotFound` when `prompt_or_synonym` resolves to no prompt.
    pub fn update_response<A>(
        &mut self,
        prompt_or_synonym: &str,
        response: impl Into<String>,
        new_actions: A,
    ) -> MutationOutcome
    where
        A: IntoIterator,
        A::Item: Into<ActionId>,
    {
        let Some(prompt) = self.prompt_for(prompt_or_synonym).map(str::to_owned) else {
            return report(
                "response_update",
                MutationOutcome::NotFound,
                "phrase is neither a prompt nor a synonym",
            );
        };
        let Some(entry) = self.catalog.get_mut(&prompt) else {
            return report(
                "response_update",
                MutationOutcome::NotFound,
                "prompt does not exist",
            );
        };

        entry.response = response.into();
        let new_actions: Vec<ActionId> = new_actions.into_iter().map(Into::into).collect();
        if !new_actions.is_empty() {
            entry.actions = new_actions;
        }

        report("response_update", MutationOutcome::Ok, "")
    }

    /// Attaches `synonym` to `prompt`.
    ///
    /// Re-attaching a synonym to its current owner is `Ok`.
    ///
    /// Outcomes:
    /// - `NotFound` when `prompt` has no response.
    /// - `Conflict` when `synonym` is itself a prompt or is owned by another
    ///   prompt.
    pub fn add_synonym(&mut self, prompt: &str, synonym: &str) -> MutationOutcome {
        if !self.catalog.contains(prompt) {
            return report(
                "synonym_add",
                MutationOutcome::NotFound,
                "prompt has no associated response",
            );
        }
        if self.catalog.contains(synonym) {
            return report(
                "synonym_add",
                MutationOutcome::Conflict,
                "synonym is already a prompt",
            );
        }

        match self.synonyms.put(synonym, prompt) {
            Ok(()) => report("synonym_add", MutationOutcome::Ok, ""),
            Err(err) => report_index_error("synonym_add", &err),
        }
    }

    /// Detaches `synonym` from `prompt`.
    ///
    /// Outcomes: `Mismatch` when `synonym` is not currently owned by `prompt`
    /// (including when it does not exist at all).
    pub fn remove_synonym(&mut self, prompt: &str, synonym: &str) -> MutationOutcome {
        match self.synonyms.remove(synonym, prompt) {
            Ok(()) => report("synonym_remove", MutationOutcome::Ok, ""),
            Err(IndexError::NotFound(_)) | Err(IndexError::Mismatch { .. }) => report(
                "synonym_remove",
                MutationOutcome::Mismatch,
                "synonym/prompt association does not exist",
            ),
            Err(err) => report_index_error("synonym_remove", &err),
        }
    }

    /// Moves an existing synonym to `new_owner`.
    ///
    /// Outcomes: `NotFound` when `synonym` is unknown or `new_owner` has no
    /// response.
    pub fn update_synonym(&mut self, synonym: &str, new_owner: &str) -> MutationOutcome {
        let Some(current) = self.synonyms.get(synonym).map(str::to_owned) else {
            return report(
                "synonym_update",
                MutationOutcome::NotFound,
                "synonym does not exist",
            );
        };
        if !self.catalog.contains(new_owner) {
            return report(
                "synonym_update",
                MutationOutcome::NotFound,
                "prompt not in dictionary",
            );
        }

        match self.synonyms.repoint(synonym, &current, new_owner) {
            Ok(()) => report("synonym_update", MutationOutcome::Ok, ""),
            Err(err) => report_index_error("synonym_update", &err),
        }
    }

    /// Returns every synonym currently owned by `prompt`.
    pub fn owners_of(&self, prompt: &str) -> BTreeSet<Synonym> {
        self.synonyms.owners_of(prompt)
    }

    /// Synonyms grouped by owning prompt.
    pub fn synonym_groups(&self) -> BTreeMap<&str, Vec<&str>> {
        self.synonyms.grouped()
    }

    /// Iterates prompts and their entries in prompt order.
    pub fn responses(&self) -> impl Iterator<Item = (&str, &ResponseEntry)> {
        self.catalog.iter()
    }

    pub fn synonym_index(&self) -> &SynonymIndex {
        &self.synonyms
    }

    pub fn response_catalog(&self) -> &ResponseCatalog {
        &self.catalog
    }

    /// Writes one synonym row per prompt that owns at least one synonym.
    pub fn write_synonym_records<W: Write>(&self, mut writer: W) -> io::Result<usize> {
        encode_synonym_groups(&mut writer, self.synonyms.grouped())
    }

    /// Writes one response row per catalog entry.
    pub fn write_response_records<W: Write>(&self, mut writer: W) -> io::Result<usize> {
        encode_response_entries(&mut writer, self.catalog.iter())
    }

    /// Flushes full engine state to `store`.
    pub fn save_to<S: DialogStore + ?Sized>(&self, store: &S) -> StoreResult<()> {
        store.save(self)
    }

    /// Drops the mapping for `text` if it is currently a synonym.
    fn release_synonym(&mut self, text: &str) {
        let Some(owner) = self.synonyms.get(text).map(str::to_owned) else {
            return;
        };
        if self.synonyms.remove(text, &owner).is_ok() {
            debug!("event=synonym_release module=dialog status=ok");
        }
    }
}

fn report(event: &'static str, outcome: MutationOutcome, reason: &str) -> MutationOutcome {
    if outcome.is_ok() {
        debug!("event={event} module=dialog status=ok");
    } else {
        warn!("event={event} module=dialog status=noop outcome={outcome} reason=\"{reason}\"");
    }
    outcome
}

fn report_index_error(event: &'static str, err: &IndexError) -> MutationOutcome {
    let outcome = match err {
        IndexError::Conflict { .. } => MutationOutcome::Conflict,
        IndexError::Mismatch { .. } => MutationOutcome::Mismatch,
        IndexError::NotFound(_) => MutationOutcome::NotFound,
    };
    debug!("event={event} module=dialog status=noop detail={err}");
    report(event, outcome, "index rejected change")
}

#[cfg(test)]
mod tests {
    use super::DialogEngine;
    use crate::model::dialog::MutationOutcome;

    fn engine() -> DialogEngine {
        DialogEngine::from_readers(
            "greeting,hi,hello\n".as_bytes(),
            "greeting,Hello there!,wave\n".as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn prompt_for_prefers_direct_hit() {
        let engine = engine();
        assert_eq!(engine.prompt_for("greeting"), Some("greeting"));
        assert_eq!(engine.prompt_for("hi"), Some("greeting"));
        assert_eq!(engine.prompt_for("bye"), None);
    }

    #[test]
    fn update_prompt_onto_own_synonym_frees_it() {
        let mut engine = engine();
        assert_eq!(engine.update_prompt("greeting", "hi"), MutationOutcome::Ok);

        assert!(engine.synonym_index().get("hi").is_none());
        assert_eq!(engine.synonym_index().get("hello"), Some("hi"));
        assert_eq!(engine.resolve("hello").response_text(), "Hello there!");
    }

    #[test]
    fn update_prompt_to_same_name_changes_nothing() {
        let mut engine = engine();
        let before = engine.clone();
        assert_eq!(engine.update_prompt("greeting", "greeting"), MutationOutcome::Ok);
        assert_eq!(engine, before);
    }
}
