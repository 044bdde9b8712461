//! SQLite-backed article store
//!
//! The store owns a single connection to the project's database file:
//! - Creates the schema on first open and migrates older layouts in place
//! - Runs filtering, sorting, counting and paging inside SQLite
//! - Keeps bicycle categories in one comma-joined column

mod queries;
mod schema;
mod types;

pub use types::*;

use std::fs;
use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::core::error::ArticleError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Database file name inside the project's `.spokes/` directory
pub const DATABASE_FILE: &str = "articles.db";

/// The article store backed by SQLite
pub struct ArticleStore {
    conn: Connection,
    paging: PagingLimits,
}

impl ArticleStore {
    /// Open or create the database at `path`, migrating it to the current schema
    pub fn open(path: &Path) -> Result<Self, ArticleError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %path.display(), "opening article database");
        let conn = Connection::open(path)?;

        // WAL lets the API server and CLI commands share the file
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(Duration::from_secs(5))?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database (tests, dry runs)
    pub fn open_in_memory() -> Result<Self, ArticleError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, ArticleError> {
        let mut store = Self {
            conn,
            paging: PagingLimits::default(),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Replace the paging defaults used by [`ArticleStore::list`]
    pub fn with_paging(mut self, paging: PagingLimits) -> Self {
        self.paging = paging;
        self
    }

    pub fn paging(&self) -> PagingLimits {
        self.paging
    }

    /// Run `op` inside one transaction, rolled back when it returns an error
    pub fn transaction<T, F>(&mut self, op: F) -> Result<T, ArticleError>
    where
        F: FnOnce(&mut Self) -> Result<T, ArticleError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match op(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests;
