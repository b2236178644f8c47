//! App Core for Scrollkeeper.
//!
//! Owns the database, the current browsing session and the settings, and
//! hands out per-view scroll restoration binders and view trackers.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::database::connection::Database;
use crate::managers::position_store::PositionStore;
use crate::managers::scroll_restoration::ScrollRestoration;
use crate::managers::view_tracker::ViewTracker;
use crate::platform::{self, history};
use crate::platform::viewport::Viewport;
use crate::services::session_storage::SqliteSessionStorage;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::StorageError;
use crate::types::position::LocationKey;

/// Central application struct.
pub struct App {
    pub db: Arc<Database>,
    pub settings_engine: SettingsEngine,
    session: SqliteSessionStorage,
}

impl App {
    /// Opens the database at `db_path`, starts a browsing session and loads
    /// settings from `settings_path` (or the platform default).
    pub fn new(db_path: &str, settings_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(db_path)?);
        Self::with_database(db, settings_path)
    }

    /// Opens `scrollkeeper.db` in the platform data directory with default settings.
    pub fn open_default() -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = platform::get_data_dir();
        std::fs::create_dir_all(&data_dir)?;
        let db_path = data_dir.join("scrollkeeper.db");
        Self::new(&db_path.to_string_lossy(), None)
    }

    /// Same as [`App::new`] over an in-memory database.
    pub fn in_memory(settings_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open_in_memory()?);
        Self::with_database(db, settings_path)
    }

    fn with_database(
        db: Arc<Database>,
        settings_path: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = SqliteSessionStorage::begin(db.clone())
            .map_err(|e| format!("session start failed: {}", e))?;

        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(e) = settings_engine.load() {
            tracing::warn!(error = %e, "settings unreadable, using defaults");
        }

        Ok(Self {
            db,
            settings_engine,
            session,
        })
    }

    /// Process-wide startup: takes scroll authority away from the browser and
    /// closes sessions an earlier run left open.
    pub fn startup(&mut self) {
        history::disable_native_scroll_restoration();

        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;
        match self.db.close_stale_sessions(self.session.session_id(), now_ms) {
            Ok(0) => {}
            Ok(closed) => tracing::info!(closed, "closed stale browsing sessions"),
            Err(e) => tracing::warn!(error = %e, "failed to close stale browsing sessions"),
        }

        tracing::info!(session_id = self.session_id(), "scrollkeeper started");
    }

    pub fn session_id(&self) -> &str {
        self.session.session_id()
    }

    /// A binder for one view mounted at `now`, persisting into the current
    /// browsing session. `loading` are the view's loading flags at mount.
    pub fn scroll_restoration<V: Viewport>(
        &self,
        key: LocationKey,
        viewport: V,
        loading: &[bool],
        now: u64,
    ) -> Result<ScrollRestoration<SqliteSessionStorage, V>, StorageError> {
        let settings = self.settings_engine.get_settings().restoration.clone();
        let storage = SqliteSessionStorage::resume(self.db.clone(), self.session_id())?;
        let store = PositionStore::new(storage, settings.storage_key_prefix.clone());
        Ok(ScrollRestoration::new(store, viewport, key, settings, loading, now))
    }

    /// A view tracker for one article page.
    pub fn view_tracker(&self, article_slug: &str, visible: bool, now: u64) -> ViewTracker {
        let settings = self.settings_engine.get_settings().view_tracking.clone();
        ViewTracker::new(article_slug, visible, now, settings)
    }

    /// Ends the browsing session; every saved scroll position is dropped.
    pub fn shutdown(&mut self) -> Result<(), StorageError> {
        self.session.end_session()?;
        tracing::info!("scrollkeeper session closed");
        Ok(())
    }
}
