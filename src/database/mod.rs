//! Persistence for session-scoped scroll records.
//!
//! ```
//! use scrollkeeper::database::{migrations, Database};
//!
//! let db = Database::open_in_memory().expect("in-memory database");
//! assert_eq!(db.schema_version(), migrations::CURRENT_SCHEMA_VERSION);
//! assert_eq!(db.close_stale_sessions("current", 0).unwrap(), 0);
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
