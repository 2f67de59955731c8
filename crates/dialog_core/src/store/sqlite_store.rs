//! SQLite store holding the same logical records as the record files.
//!
//! # Responsibility
//! - Open a dialog database and create the dialog tables on first use.
//! - Persist synonyms and responses into `dialog_synonyms` /
//!   `dialog_responses`.
//! - Rebuild a `DialogEngine` from those tables.
//!
//! # Invariants
//! - The dialog schema version is tracked via `PRAGMA user_version`; a
//!   database written by a newer schema is refused, never rewritten.
//! - `save` replaces both tables inside one transaction.
//! - `actions_json` always holds a JSON array of strings; anything else is
//!   rejected on load instead of being masked.

use super::{DialogStore, StoreError, StoreResult};
use crate::codec::{ResponseRecord, SynonymRecord};
use crate::model::dialog::{ActionId, ResponseEntry};
use crate::service::dialog_engine::DialogEngine;
use log::{error, info};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::{Duration, Instant};

/// Version written to `user_version` once the dialog tables exist.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("sqlite_schema.sql");

/// SQLite-backed dialog store owning its connection.
pub struct SqliteDialogStore {
    conn: Connection,
}

impl SqliteDialogStore {
    /// Opens (or creates) a dialog database file.
    ///
    /// Emits `store_open` events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        open_with("file", || Connection::open(path))
    }

    /// Opens a private in-memory dialog database.
    pub fn open_in_memory() -> StoreResult<Self> {
        open_with("memory", Connection::open_in_memory)
    }

    /// Adopts an already-open connection, creating the dialog tables if the
    /// database has none yet.
    pub fn from_connection(mut conn: Connection) -> StoreResult<Self> {
        ensure_schema(&mut conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for inspection and ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn open_with<F>(mode: &'static str, connect: F) -> StoreResult<SqliteDialogStore>
where
    F: FnOnce() -> rusqlite::Result<Connection>,
{
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode={mode}");

    let opened = connect()
        .map_err(StoreError::from)
        .and_then(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            SqliteDialogStore::from_connection(conn)
        });

    match &opened {
        Ok(_) => info!(
            "event=store_open module=store status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=store_open module=store status=error mode={mode} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    opened
}

fn ensure_schema(conn: &mut Connection) -> StoreResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchemaVersion {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    info!("event=store_schema module=store status=ok from={found} to={SCHEMA_VERSION}");
    Ok(())
}

impl DialogStore for SqliteDialogStore {
    fn load(&self) -> StoreResult<DialogEngine> {
        let mut stmt = self.conn.prepare(
            "SELECT prompt, response, actions_json
             FROM dialog_responses
             ORDER BY prompt ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut responses = Vec::new();
        while let Some(row) = rows.next()? {
            responses.push(parse_response_row(row)?);
        }

        let mut stmt = self.conn.prepare(
            "SELECT prompt, synonym
             FROM dialog_synonyms
             ORDER BY prompt ASC, synonym ASC;",
        )?;
        let synonyms = stmt
            .query_map([], |row| {
                Ok(SynonymRecord {
                    prompt: row.get("prompt")?,
                    synonyms: vec![row.get("synonym")?],
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "event=store_load module=store status=ok mode=sqlite response_rows={} synonym_rows={}",
            responses.len(),
            synonyms.len()
        );
        Ok(DialogEngine::from_records(synonyms, responses))
    }

    fn save(&self, engine: &DialogEngine) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM dialog_synonyms;", [])?;
        tx.execute("DELETE FROM dialog_responses;", [])?;

        {
            let mut insert_response = tx.prepare(
                "INSERT INTO dialog_responses (prompt, response, actions_json)
                 VALUES (?1, ?2, ?3);",
            )?;
            for (prompt, entry) in engine.responses() {
                let actions_json = serde_json::to_string(&entry.actions)
                    .map_err(|err| StoreError::InvalidData(err.to_string()))?;
                insert_response.execute(params![prompt, entry.response.as_str(), actions_json])?;
            }

            let mut insert_synonym = tx.prepare(
                "INSERT INTO dialog_synonyms (synonym, prompt)
                 VALUES (?1, ?2);",
            )?;
            for (synonym, prompt) in engine.synonym_index().iter() {
                insert_synonym.execute(params![synonym, prompt])?;
            }
        }

        tx.commit()?;
        info!(
            "event=store_save module=store status=ok mode=sqlite response_rows={} synonym_rows={}",
            engine.response_catalog().len(),
            engine.synonym_index().len()
        );
        Ok(())
    }
}

fn parse_response_row(row: &Row<'_>) -> StoreResult<ResponseRecord> {
    let prompt: String = row.get("prompt")?;
    let actions_json: String = row.get("actions_json")?;
    let actions: Vec<ActionId> = serde_json::from_str(&actions_json).map_err(|err| {
        StoreError::InvalidData(format!(
            "invalid actions_json for prompt row in dialog_responses: {err}"
        ))
    })?;

    Ok(ResponseRecord {
        prompt,
        entry: ResponseEntry {
            response: row.get("response")?,
            actions,
        },
    })
}
