//! Session-scoped key-value storage.
//!
//! Values survive reloads within one browsing session and disappear when the
//! session ends. Two backends are provided: an in-memory map and a SQLite
//! table keyed by session id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::connection::Database;
use crate::types::errors::StorageError;

/// String key-value store with session lifetime.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: SessionStorage + ?Sized> SessionStorage for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

// === In-memory backend ===

/// In-memory storage. Optionally starts out unavailable, mimicking a browser
/// that refuses storage access (private mode, quota exhausted).
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: HashMap<String, String>,
    unavailable: bool,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage whose every operation fails.
    pub fn unavailable() -> Self {
        Self {
            items: HashMap::new(),
            unavailable: true,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable(
                "storage access denied".to_string(),
            ));
        }
        Ok(())
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.items.remove(key);
        Ok(())
    }
}

// === SQLite backend ===

/// Storage rows scoped to one browsing session in SQLite.
pub struct SqliteSessionStorage {
    db: Arc<Database>,
    session_id: String,
    ended: bool,
}

impl SqliteSessionStorage {
    /// Starts a new browsing session with a fresh id.
    pub fn begin(db: Arc<Database>) -> Result<Self, StorageError> {
        let session_id = Uuid::new_v4().to_string();
        db.connection()
            .execute(
                "INSERT INTO browsing_sessions (id, started_at, ended_at) VALUES (?1, ?2, NULL)",
                params![session_id, now_millis()],
            )
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;

        tracing::debug!(session_id = %session_id, "browsing session started");
        Ok(Self {
            db,
            session_id,
            ended: false,
        })
    }

    /// Reattaches to a session that is still open, e.g. after a page reload.
    pub fn resume(db: Arc<Database>, session_id: &str) -> Result<Self, StorageError> {
        let ended_at: Option<Option<i64>> = db
            .connection()
            .query_row(
                "SELECT ended_at FROM browsing_sessions WHERE id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;

        match ended_at {
            Some(None) => Ok(Self {
                db,
                session_id: session_id.to_string(),
                ended: false,
            }),
            Some(Some(_)) => Err(StorageError::Unavailable(format!(
                "session {} has ended",
                session_id
            ))),
            None => Err(StorageError::Unavailable(format!(
                "unknown session {}",
                session_id
            ))),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Ends the session: drops every stored value and refuses further access.
    pub fn end_session(&mut self) -> Result<(), StorageError> {
        if self.ended {
            return Ok(());
        }
        let conn = self.db.connection();
        conn.execute(
            "DELETE FROM session_storage WHERE session_id = ?1",
            params![self.session_id],
        )
        .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        conn.execute(
            "UPDATE browsing_sessions SET ended_at = ?1 WHERE id = ?2",
            params![now_millis(), self.session_id],
        )
        .map_err(|e| StorageError::DatabaseError(e.to_string()))?;

        self.ended = true;
        tracing::debug!(session_id = %self.session_id, "browsing session ended");
        Ok(())
    }

    /// Fails once the session has ended, through this handle or any other
    /// handle on the same session.
    fn check_open(&self) -> Result<(), StorageError> {
        let ended = self.ended
            || self
                .db
                .connection()
                .query_row(
                    "SELECT ended_at IS NOT NULL FROM browsing_sessions WHERE id = ?1",
                    params![self.session_id],
                    |row| row.get::<_, bool>(0),
                )
                .optional()
                .map_err(|e| StorageError::DatabaseError(e.to_string()))?
                .unwrap_or(true);
        if ended {
            return Err(StorageError::Unavailable(format!(
                "session {} has ended",
                self.session_id
            )));
        }
        Ok(())
    }
}

impl SessionStorage for SqliteSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_open()?;
        self.db
            .connection()
            .query_row(
                "SELECT value FROM session_storage WHERE session_id = ?1 AND key = ?2",
                params![self.session_id, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_open()?;
        self.db
            .connection()
            .execute(
                "INSERT INTO session_storage (session_id, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(session_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![self.session_id, key, value, now_millis()],
            )
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_open()?;
        self.db
            .connection()
            .execute(
                "DELETE FROM session_storage WHERE session_id = ?1 AND key = ?2",
                params![self.session_id, key],
            )
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
