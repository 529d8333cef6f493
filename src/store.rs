use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::roster::{Roster, Session};

/// JSON object text mapping id strings to records.
pub const KEY_STUDENTS: &str = "studentsData";
/// Decimal string of the next id to assign.
pub const KEY_LAST_ID: &str = "lastId";

/// Persisted state is two string values in a key-value table: the roster as
/// JSON object text and the id counter as decimal text.
pub fn open_store(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("roster.sqlite3");
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    // Older revisions persisted the counter under "currentId".
    migrate_current_id_key(&conn)?;

    Ok(conn)
}

fn migrate_current_id_key(conn: &Connection) -> anyhow::Result<()> {
    if kv_get(conn, KEY_LAST_ID)?.is_some() {
        return Ok(());
    }
    let Some(legacy) = kv_get(conn, "currentId")? else {
        return Ok(());
    };
    kv_set(conn, KEY_LAST_ID, &legacy)?;
    conn.execute("DELETE FROM kv WHERE key = ?", ["currentId"])?;
    Ok(())
}

pub fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
            row.get::<_, String>(0)
        })
        .optional()?;
    Ok(value)
}

pub fn kv_set(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO kv(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}

/// Loads the session, failing soft: a missing or malformed value never
/// surfaces an error, it just falls back to an empty roster / counter 1.
/// `Session::new` then floors the counter above any surviving key.
pub fn load_session(conn: &Connection) -> Session {
    let roster: Roster = kv_get(conn, KEY_STUDENTS)
        .ok()
        .flatten()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default();

    let stored_next_id = kv_get(conn, KEY_LAST_ID)
        .ok()
        .flatten()
        .and_then(|text| text.trim().parse::<u64>().ok())
        .unwrap_or(1);

    Session::new(roster, stored_next_id)
}

/// Writes both keys in one transaction. Callers treat failure as
/// best-effort: the in-memory mutation stands and the error is only logged.
pub fn save_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    let students = serde_json::to_string(&session.roster)?;
    let tx = conn.unchecked_transaction()?;
    kv_set(&tx, KEY_STUDENTS, &students)?;
    kv_set(&tx, KEY_LAST_ID, &session.next_id.to_string())?;
    tx.commit()?;
    Ok(())
}

/// Flush after a mutation. A failed write is logged and swallowed: the
/// in-memory state stays authoritative until the next successful save.
pub fn persist_best_effort(conn: &Connection, session: &Session) {
    if let Err(e) = save_session(conn, session) {
        tracing::error!("failed to persist roster state: {e:?}");
    }
}
