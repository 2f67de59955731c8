//! Environment-driven configuration for dialog hosts.
//!
//! # Responsibility
//! - Locate the synonym/response record files.
//! - Carry logging settings into `init_logging`.
//!
//! # Invariants
//! - Unset variables fall back to documented defaults; set-but-empty values
//!   are rejected.

use crate::logging::{default_log_level, init_logging};
use crate::store::CsvDialogStore;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_SYNONYMS_FILE: &str = "DIALOG_SYNONYMS_FILE";
pub const ENV_RESPONSES_FILE: &str = "DIALOG_RESPONSES_FILE";
pub const ENV_LOG_LEVEL: &str = "DIALOG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "DIALOG_LOG_DIR";

const DEFAULT_SYNONYMS_FILE: &str = "synonyms.csv";
const DEFAULT_RESPONSES_FILE: &str = "responses.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogConfig {
    pub synonyms_path: PathBuf,
    pub responses_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` disables file logging.
    pub log_dir: Option<String>,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            synonyms_path: PathBuf::from(DEFAULT_SYNONYMS_FILE),
            responses_path: PathBuf::from(DEFAULT_RESPONSES_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl DialogConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(key) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
                Some(value) => Ok(Some(value.trim().to_string())),
                None => Ok(None),
            }
        };

        Ok(Self {
            synonyms_path: read(ENV_SYNONYMS_FILE)?
                .map(PathBuf::from)
                .unwrap_or(defaults.synonyms_path),
            responses_path: read(ENV_RESPONSES_FILE)?
                .map(PathBuf::from)
                .unwrap_or(defaults.responses_path),
            log_level: read(ENV_LOG_LEVEL)?.unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR)?,
        })
    }

    /// Starts file logging when `log_dir` is set.
    ///
    /// Returns `Ok(false)` when no log directory is configured.
    pub fn init_logging(&self) -> Result<bool, String> {
        match self.log_dir.as_deref() {
            Some(log_dir) => init_logging(&self.log_level, log_dir).map(|()| true),
            None => Ok(false),
        }
    }

    /// Record-file store for the configured paths.
    pub fn csv_store(&self) -> CsvDialogStore {
        CsvDialogStore::new(&self.synonyms_path, &self.responses_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue(key) => write!(f, "environment variable `{key}` must not be empty"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DialogConfig, ENV_LOG_DIR, ENV_RESPONSES_FILE, ENV_SYNONYMS_FILE};
    use std::collections::HashMap;
    use std::path::Path;

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let config = DialogConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, DialogConfig::default());
        assert_eq!(config.csv_store().synonyms_path(), Path::new("synonyms.csv"));
    }

    #[test]
    fn set_values_override_defaults() {
        let vars = HashMap::from([
            (ENV_SYNONYMS_FILE, "/data/syn.csv"),
            (ENV_RESPONSES_FILE, " /data/resp.csv "),
            (ENV_LOG_DIR, "/var/log/dialog"),
        ]);
        let config =
            DialogConfig::from_lookup(|key| vars.get(key).map(|value| value.to_string())).unwrap();

        assert_eq!(config.synonyms_path, Path::new("/data/syn.csv"));
        assert_eq!(config.responses_path, Path::new("/data/resp.csv"));
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/dialog"));
    }

    #[test]
    fn empty_values_are_rejected() {
        let err = DialogConfig::from_lookup(|key| {
            (key == ENV_SYNONYMS_FILE).then(|| "  ".to_string())
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyValue(ENV_SYNONYMS_FILE));
    }
}
