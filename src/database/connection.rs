//! SQLite handle for the session storage backend.

use rusqlite::{params, Connection};
use std::path::Path;

use super::migrations;

/// A migrated SQLite connection holding session-scoped rows.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file at `path` and brings the schema up to date.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open(path)?)
    }

    /// In-memory database; everything is gone when it is dropped.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn schema_version(&self) -> i32 {
        migrations::get_schema_version(&self.conn)
    }

    /// Ends every browsing session other than `keep` that was never closed,
    /// e.g. after a crash, and drops its stored values. Returns how many
    /// sessions were closed.
    pub fn close_stale_sessions(&self, keep: &str, now_ms: i64) -> Result<usize, rusqlite::Error> {
        self.conn.execute(
            "DELETE FROM session_storage WHERE session_id IN (
                 SELECT id FROM browsing_sessions WHERE ended_at IS NULL AND id != ?1
             )",
            params![keep],
        )?;
        self.conn.execute(
            "UPDATE browsing_sessions SET ended_at = ?1 WHERE ended_at IS NULL AND id != ?2",
            params![now_ms, keep],
        )
    }
}
