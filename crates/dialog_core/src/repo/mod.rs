//! In-memory dialog maps and their error contract.
//!
//! # Responsibility
//! - Hold the two dictionaries behind `DialogEngine`.
//! - Report ownership/lookup violations as semantic errors.
//!
//! # Invariants
//! - Index and catalog never reference each other; cross-map consistency is
//!   the engine's job.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod response_catalog;
pub mod synonym_index;

pub type IndexResult<T> = Result<T, IndexError>;

/// Semantic failure from `SynonymIndex` or `ResponseCatalog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Synonym already owned by a different prompt.
    Conflict { synonym: String, owner: String },
    /// Synonym/prompt pairing does not currently hold.
    Mismatch {
        synonym: String,
        expected: String,
        actual: String,
    },
    /// Referenced prompt or synonym does not exist.
    NotFound(String),
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict { synonym, owner } => {
                write!(f, "synonym `{synonym}` already associated with prompt `{owner}`")
            }
            Self::Mismatch {
                synonym,
                expected,
                actual,
            } => write!(
                f,
                "synonym `{synonym}` belongs to `{actual}`, not `{expected}`"
            ),
            Self::NotFound(key) => write!(f, "`{key}` does not exist"),
        }
    }
}

impl Error for IndexError {}
