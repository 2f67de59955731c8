//! Dialog domain types.
//!
//! # Responsibility
//! - Describe what a resolved phrase yields (`ResponseEntry`, `Resolution`).
//! - Describe how a mutation ended (`MutationOutcome`, `AddPromptOutcome`).
//!
//! # Invariants
//! - `Resolution::Unknown` always renders as [`UNKNOWN_RESPONSE`].
//! - Domain failures are values, never `Err`: callers may retry freely after
//!   any non-`Ok` outcome.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Canonical key phrase of the response catalog.
pub type Prompt = String;

/// Alternate phrase that resolves to exactly one prompt.
pub type Synonym = String;

/// Opaque action identifier, interpreted by an external executor.
pub type ActionId = String;

/// Sentinel text returned when a phrase resolves to nothing.
pub const UNKNOWN_RESPONSE: &str = "unkn";

/// Catalog value stored for one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEntry {
    /// Text spoken/printed back to the user.
    pub response: String,
    /// Ordered follow-up actions. May be empty.
    pub actions: Vec<ActionId>,
}

impl ResponseEntry {
    pub fn new<I, S>(response: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ActionId>,
    {
        Self {
            response: response.into(),
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of resolving one input phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Direct prompt hit, or synonym hit whose owner has an entry.
    Known(&'a ResponseEntry),
    /// Neither a prompt nor a synonym of a cataloged prompt.
    Unknown,
}

impl<'a> Resolution<'a> {
    /// Returns the matched entry, if any.
    pub fn entry(self) -> Option<&'a ResponseEntry> {
        match self {
            Self::Known(entry) => Some(entry),
            Self::Unknown => None,
        }
    }

    /// Returns the response text, or [`UNKNOWN_RESPONSE`] when unresolved.
    pub fn response_text(self) -> &'a str {
        match self {
            Self::Known(entry) => entry.response.as_str(),
            Self::Unknown => UNKNOWN_RESPONSE,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl Display for Resolution<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(entry) if entry.actions.is_empty() => write!(f, "{}", entry.response),
            Self::Known(entry) => write!(f, "{} [{}]", entry.response, entry.actions.join(", ")),
            Self::Unknown => write!(f, "{UNKNOWN_RESPONSE}"),
        }
    }
}

/// Enumerated result of one engine mutation.
///
/// Anything other than `Ok` means the engine state was left unchanged.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOutcome {
    /// The mutation was applied (or was already in effect).
    Ok,
    /// A prompt or synonym is already owned elsewhere.
    Conflict,
    /// The referenced prompt or synonym does not exist.
    NotFound,
    /// The referenced synonym/prompt pairing does not currently hold.
    Mismatch,
}

impl MutationOutcome {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// Stable lowercase label used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Mismatch => "mismatch",
        }
    }
}

impl Display for MutationOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of `DialogEngine::add_prompt`.
///
/// Each synonym is inserted independently, so one rejected synonym does not
/// undo the prompt insertion or its sibling synonyms.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPromptOutcome {
    pub prompt: MutationOutcome,
    /// Per-synonym outcome, in input order. Empty when `prompt` is not `Ok`.
    pub synonyms: Vec<(Synonym, MutationOutcome)>,
}

impl AddPromptOutcome {
    /// Synonyms that could not be attached to the new prompt.
    pub fn rejected_synonyms(&self) -> impl Iterator<Item = &str> {
        self.synonyms
            .iter()
            .filter(|(_, outcome)| !outcome.is_ok())
            .map(|(synonym, _)| synonym.as_str())
    }
}
