//! Record-file store: one synonym file and one response file.
//!
//! # Invariants
//! - Each save truncates and rewrites both files completely.
//! - File handles are scoped to a single call and closed on every path.

use super::{DialogStore, StoreResult};
use crate::service::dialog_engine::DialogEngine;
use log::{error, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Pair of comma-separated record files backing a `DialogEngine`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDialogStore {
    synonyms_path: PathBuf,
    responses_path: PathBuf,
}

impl CsvDialogStore {
    pub fn new(synonyms_path: impl Into<PathBuf>, responses_path: impl Into<PathBuf>) -> Self {
        Self {
            synonyms_path: synonyms_path.into(),
            responses_path: responses_path.into(),
        }
    }

    pub fn synonyms_path(&self) -> &Path {
        &self.synonyms_path
    }

    pub fn responses_path(&self) -> &Path {
        &self.responses_path
    }
}

impl DialogStore for CsvDialogStore {
    fn load(&self) -> StoreResult<DialogEngine> {
        let started_at = Instant::now();
        let result = File::open(&self.synonyms_path).and_then(|synonyms| {
            let responses = File::open(&self.responses_path)?;
            DialogEngine::from_readers(synonyms, responses)
        });

        match result {
            Ok(engine) => {
                info!(
                    "event=store_load module=store status=ok mode=csv duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(engine)
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error mode=csv duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn save(&self, engine: &DialogEngine) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = write_file(&self.synonyms_path, |writer| {
            engine.write_synonym_records(writer)
        })
        .and_then(|synonym_rows| {
            let response_rows = write_file(&self.responses_path, |writer| {
                engine.write_response_records(writer)
            })?;
            Ok((synonym_rows, response_rows))
        });

        match result {
            Ok((synonym_rows, response_rows)) => {
                info!(
                    "event=store_save module=store status=ok mode=csv synonym_rows={} response_rows={} duration_ms={}",
                    synonym_rows,
                    response_rows,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error mode=csv duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

fn write_file<F>(path: &Path, write_rows: F) -> std::io::Result<usize>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<usize>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    let rows = write_rows(&mut writer)?;
    writer.flush()?;
    Ok(rows)
}
