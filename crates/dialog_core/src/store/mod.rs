//! Persistence targets for dialog state.
//!
//! # Responsibility
//! - Define the load/save contract between `DialogEngine` and storage.
//! - Provide record-file and SQLite implementations.
//!
//! # Invariants
//! - `save` always writes the full engine state; there is no partial flush.
//! - Saving is not transactional for record files: an interrupted write can
//!   leave a truncated file behind.

use crate::service::dialog_engine::DialogEngine;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod csv_store;
pub mod sqlite_store;

pub use csv_store::CsvDialogStore;
pub use sqlite_store::{SqliteDialogStore, SCHEMA_VERSION};

pub type StoreResult<T> = Result<T, StoreError>;

/// Hard failure while reading or writing persisted dialog state.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "dialog schema version {found} is newer than supported {supported}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted dialog data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Storage backend able to rebuild and persist a `DialogEngine`.
pub trait DialogStore {
    fn load(&self) -> StoreResult<DialogEngine>;
    fn save(&self, engine: &DialogEngine) -> StoreResult<()>;
}
