//! # Database State
//!
//! Wraps the `Database` handle for commands. The inner `SqlitePool` is
//! thread-safe, so commands query concurrently without extra locking.

use partsdesk_db::Database;

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// The wrapped database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
