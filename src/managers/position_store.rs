//! Position Store for Scrollkeeper.
//!
//! Persists one scroll position per location key as JSON in session storage.
//! Every failure is swallowed and logged; callers only ever see "no record".

use std::time::{SystemTime, UNIX_EPOCH};

use crate::platform::viewport::Viewport;
use crate::services::session_storage::SessionStorage;
use crate::types::position::{LocationKey, ScrollPosition};

/// Trait defining scroll position persistence.
pub trait PositionStoreTrait {
    /// Captures the viewport's current offsets and persists them under `key`.
    /// Returns the captured record, whether or not the write succeeded.
    fn save<V: Viewport + ?Sized>(&mut self, key: &LocationKey, viewport: &V) -> ScrollPosition;
    /// The record for `key`, or `None` if absent, unreadable or corrupt.
    fn load(&self, key: &LocationKey) -> Option<ScrollPosition>;
    fn clear(&mut self, key: &LocationKey);
    /// Jumps straight to the saved offsets. Returns whether a record existed.
    fn scroll_to_saved<V: Viewport + ?Sized>(&self, key: &LocationKey, viewport: &mut V) -> bool;
}

/// Position store over any [`SessionStorage`] backend.
pub struct PositionStore<S: SessionStorage> {
    storage: S,
    prefix: String,
}

impl<S: SessionStorage> PositionStore<S> {
    pub fn new(storage: S, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    /// The storage key a location is persisted under.
    pub fn storage_key(&self, key: &LocationKey) -> String {
        format!("{}{}", self.prefix, key.as_str())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

impl<S: SessionStorage> PositionStoreTrait for PositionStore<S> {
    fn save<V: Viewport + ?Sized>(&mut self, key: &LocationKey, viewport: &V) -> ScrollPosition {
        let position = ScrollPosition {
            x: viewport.scroll_x(),
            y: viewport.scroll_y(),
            timestamp: Self::now_millis(),
        };

        let storage_key = self.storage_key(key);
        match serde_json::to_string(&position) {
            Ok(json) => {
                if let Err(e) = self.storage.set_item(&storage_key, &json) {
                    tracing::warn!(key = %key, error = %e, "failed to persist scroll position");
                } else {
                    tracing::trace!(key = %key, y = position.y, "scroll position saved");
                }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to encode scroll position");
            }
        }
        position
    }

    fn load(&self, key: &LocationKey) -> Option<ScrollPosition> {
        let raw = match self.storage.get_item(&self.storage_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "scroll position unreadable");
                return None;
            }
        };

        match serde_json::from_str::<ScrollPosition>(&raw) {
            Ok(position) => Some(position),
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "ignoring corrupt scroll position");
                None
            }
        }
    }

    fn clear(&mut self, key: &LocationKey) {
        let storage_key = self.storage_key(key);
        if let Err(e) = self.storage.remove_item(&storage_key) {
            tracing::debug!(key = %key, error = %e, "failed to clear scroll position");
        }
    }

    fn scroll_to_saved<V: Viewport + ?Sized>(&self, key: &LocationKey, viewport: &mut V) -> bool {
        match self.load(key) {
            Some(position) => {
                viewport.scroll_to(position.x, position.y);
                true
            }
            None => false,
        }
    }
}
