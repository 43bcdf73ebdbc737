//! The SQLite file behind the session store.
//!
//! One connection serves every turn. Each turn reads and writes a single
//! row, so a mutex around the connection is all the sharing needed.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use hearth_core::error::HearthError;

use crate::migrations;

/// Applied to file databases on open.
const FILE_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
                            PRAGMA synchronous = NORMAL;
                            PRAGMA busy_timeout = 5000;";

/// Migrated session database.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database file at `path`, creating it and its directory if
    /// missing.
    pub fn new(path: &Path) -> Result<Self, HearthError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| {
            HearthError::Storage(format!("cannot open {}: {}", path.display(), e))
        })?;
        conn.execute_batch(FILE_PRAGMAS)
            .map_err(|e| HearthError::Storage(format!("cannot configure {}: {}", path.display(), e)))?;

        let db = Self::migrated(conn)?;
        info!(path = %path.display(), "Session database ready");
        Ok(db)
    }

    /// A throwaway database that lives as long as the value.
    pub fn in_memory() -> Result<Self, HearthError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| HearthError::Storage(format!("cannot open in-memory database: {}", e)))?;
        Self::migrated(conn)
    }

    fn migrated(conn: Connection) -> Result<Self, HearthError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        debug!("Session schema up to date");
        Ok(db)
    }

    /// Run `f` against the connection. Other callers wait until it returns.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, HearthError>
    where
        F: FnOnce(&Connection) -> Result<T, HearthError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| HearthError::Storage(format!("session database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
