use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::LocationError;

/// A saved scroll position for one location.
///
/// `timestamp` is wall-clock milliseconds since the Unix epoch at save time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
    pub timestamp: i64,
}

/// Identifies one scrollable context: the path plus its normalized query string.
///
/// Two views share saved scroll state iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationKey(String);

impl LocationKey {
    /// Builds a key from a path and a raw query string (with or without the leading `?`).
    ///
    /// An empty path is treated as `/`. Empty `&`-segments are dropped and the
    /// parameter order is kept as given.
    pub fn new(path: &str, query: &str) -> Self {
        let path = if path.is_empty() { "/" } else { path };
        let query = normalize_query(query);
        if query.is_empty() {
            Self(path.to_string())
        } else {
            Self(format!("{}?{}", path, query))
        }
    }

    /// Parses a location such as `/articles?page=2#top`. The fragment is discarded.
    pub fn parse(location: &str) -> Result<Self, LocationError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LocationError::Empty);
        }

        let without_fragment = match location.split_once('#') {
            Some((before, _)) => before,
            None => location,
        };
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };

        if !path.is_empty() && !path.starts_with('/') {
            return Err(LocationError::NotAbsolute(path.to_string()));
        }

        Ok(Self::new(path, query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path portion of the key.
    pub fn path(&self) -> &str {
        match self.0.split_once('?') {
            Some((path, _)) => path,
            None => &self.0,
        }
    }

    /// The normalized query portion of the key, if any.
    pub fn query(&self) -> Option<&str> {
        self.0.split_once('?').map(|(_, query)| query)
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_query(query: &str) -> String {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("&")
}
