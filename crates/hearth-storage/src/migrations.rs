//! Database schema migrations.
//!
//! Version 1 creates the dialogue_sessions table alongside the
//! schema_migrations bookkeeping table.

use rusqlite::Connection;
use tracing::info;

use hearth_core::error::HearthError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), HearthError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| HearthError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| HearthError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: dialogue_sessions");
    }

    Ok(())
}

/// Version 1: one row per dialogue session.
///
/// Answers and the generation outcome are stored as JSON text.
fn apply_v1(conn: &Connection) -> Result<(), HearthError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS dialogue_sessions (
            session_id     TEXT PRIMARY KEY NOT NULL,
            schema_id      TEXT NOT NULL,
            mode           TEXT NOT NULL DEFAULT 'unset'
                           CHECK (mode IN ('unset', 'guided', 'bulk')),
            answers        TEXT NOT NULL DEFAULT '{}',
            cursor         TEXT,
            completed      INTEGER NOT NULL DEFAULT 0,
            stalled_turns  INTEGER NOT NULL DEFAULT 0,
            grace_used     INTEGER NOT NULL DEFAULT 0,
            outcome        TEXT,
            created_at     INTEGER NOT NULL,
            updated_at     INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_dialogue_sessions_schema
            ON dialogue_sessions (schema_id, updated_at DESC);

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'dialogue_sessions');
        ",
    )
    .map_err(|e| HearthError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
