use dialog_core::{
    DialogEngine, DialogStore, ResponseEntry, SqliteDialogStore, StoreError, SCHEMA_VERSION,
};
use rusqlite::Connection;

fn sample_engine() -> DialogEngine {
    let mut engine = DialogEngine::new();
    let _ = engine.add_prompt("greeting", "Hello there!", ["wave"], ["hi", "hello"]);
    let _ = engine.add_prompt("thanks", "You're welcome", Vec::<String>::new(), ["ty"]);
    engine
}

#[test]
fn open_in_memory_creates_dialog_tables() {
    let store = SqliteDialogStore::open_in_memory().unwrap();
    let conn = store.connection();

    assert_eq!(schema_version(conn), SCHEMA_VERSION);
    assert_table_exists(conn, "dialog_responses");
    assert_table_exists(conn, "dialog_synonyms");
}

#[test]
fn reopening_existing_database_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dialog.db");

    sample_engine()
        .save_to(&SqliteDialogStore::open(&path).unwrap())
        .unwrap();

    let reopened = SqliteDialogStore::open(&path).unwrap();
    assert_eq!(schema_version(reopened.connection()), SCHEMA_VERSION);
    assert_eq!(reopened.load().unwrap(), sample_engine());
}

#[test]
fn opening_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match SqliteDialogStore::open(&path) {
        Err(StoreError::UnsupportedSchemaVersion { found, supported }) => {
            assert_eq!(found, 999);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer schema was accepted"),
    }
}

#[test]
fn from_connection_bootstraps_fresh_database() {
    let conn = Connection::open_in_memory().unwrap();
    let store = SqliteDialogStore::from_connection(conn).unwrap();

    assert_eq!(store.load().unwrap(), DialogEngine::new());
}

#[test]
fn save_then_load_roundtrips_including_empty_actions() {
    let store = SqliteDialogStore::open_in_memory().unwrap();
    let engine = sample_engine();

    engine.save_to(&store).unwrap();
    let reloaded = store.load().unwrap();

    assert_eq!(reloaded, engine);
    assert_eq!(
        reloaded.resolve("ty").entry(),
        Some(&ResponseEntry::new("You're welcome", Vec::<String>::new()))
    );
}

#[test]
fn padded_and_empty_phrases_survive_sqlite_roundtrip() {
    let store = SqliteDialogStore::open_in_memory().unwrap();
    let mut engine = DialogEngine::new();
    let _ = engine.add_prompt(" padded", "  spaced ", [""], [" hi", ""]);

    engine.save_to(&store).unwrap();

    assert_eq!(store.load().unwrap(), engine);
}

#[test]
fn save_replaces_previous_rows() {
    let store = SqliteDialogStore::open_in_memory().unwrap();
    sample_engine().save_to(&store).unwrap();

    let mut engine = store.load().unwrap();
    assert!(engine.remove_prompt("greeting").is_ok());
    engine.save_to(&store).unwrap();

    let synonym_rows: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM dialog_synonyms;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(synonym_rows, 1);
    assert_eq!(store.load().unwrap().resolve("hi").response_text(), "unkn");
}

#[test]
fn invalid_actions_json_is_rejected_on_load() {
    let store = SqliteDialogStore::open_in_memory().unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO dialog_responses (prompt, response, actions_json) VALUES ('p', 'r', 'not json');",
            [],
        )
        .unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
