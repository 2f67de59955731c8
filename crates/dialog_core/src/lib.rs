//! Dialog resolution core.
//!
//! Maps typed or transcribed phrases to canned responses and follow-up
//! actions. Many phrasings (synonyms) converge on one canonical prompt; the
//! prompt keys a response catalog. This crate is the single owner of the
//! synonym-ownership and catalog-consistency invariants.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod speech;
pub mod store;

pub use config::{ConfigError, DialogConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::dialog::{
    ActionId, AddPromptOutcome, MutationOutcome, Prompt, Resolution, ResponseEntry, Synonym,
    UNKNOWN_RESPONSE,
};
pub use repo::response_catalog::ResponseCatalog;
pub use repo::synonym_index::SynonymIndex;
pub use repo::{IndexError, IndexResult};
pub use service::dialog_engine::DialogEngine;
pub use speech::{
    transcribe_checked, AudioCapture, FormatError, PcmBuffer, PcmFormat, SpeechError,
    SpeechRecognizer,
};
pub use store::{
    CsvDialogStore, DialogStore, SqliteDialogStore, StoreError, StoreResult, SCHEMA_VERSION,
};

