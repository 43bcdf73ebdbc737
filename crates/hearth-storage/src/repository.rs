//! SQLite-backed session repository.

use std::sync::Arc;

use rusqlite::OptionalExtension;

use hearth_core::error::HearthError;
use hearth_core::types::{DialogueMode, Session, Timestamp};

use crate::db::Database;
use crate::SessionPersistence;

/// Repository for dialogue sessions.
pub struct SessionRepository {
    db: Arc<Database>,
}

impl SessionRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert or replace a session row.
    pub fn save(&self, session: &Session) -> Result<(), HearthError> {
        let answers = serde_json::to_string(&session.answers)?;
        let outcome = session
            .outcome
            .as_ref()
            .map(|o| serde_json::to_string(o))
            .transpose()?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO dialogue_sessions
                    (session_id, schema_id, mode, answers, cursor, completed,
                     stalled_turns, grace_used, outcome, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(session_id) DO UPDATE SET
                    schema_id = excluded.schema_id,
                    mode = excluded.mode,
                    answers = excluded.answers,
                    cursor = excluded.cursor,
                    completed = excluded.completed,
                    stalled_turns = excluded.stalled_turns,
                    grace_used = excluded.grace_used,
                    outcome = excluded.outcome,
                    updated_at = excluded.updated_at",
                rusqlite::params![
                    session.session_id,
                    session.schema_id,
                    session.mode.as_str(),
                    answers,
                    session.cursor,
                    session.completed as i32,
                    session.stalled_turns,
                    session.grace_used as i32,
                    outcome,
                    session.created_at.0,
                    session.updated_at.0,
                ],
            )
            .map_err(|e| HearthError::Storage(format!("Failed to save session: {}", e)))?;
            Ok(())
        })
    }

    /// Find a session by id.
    pub fn find_by_id(&self, session_id: &str) -> Result<Option<Session>, HearthError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT session_id, schema_id, mode, answers, cursor, completed,
                            stalled_turns, grace_used, outcome, created_at, updated_at
                     FROM dialogue_sessions WHERE session_id = ?1",
                )
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            let result = stmt
                .query_row(rusqlite::params![session_id], |row| {
                    Ok(row_to_session(row))
                })
                .optional()
                .map_err(|e| HearthError::Storage(e.to_string()))?;

            match result {
                Some(session) => Ok(Some(session?)),
                None => Ok(None),
            }
        })
    }

    /// Number of stored sessions.
    pub fn count(&self) -> Result<u64, HearthError> {
        self.db.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM dialogue_sessions", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as u64)
            .map_err(|e| HearthError::Storage(e.to_string()))
        })
    }
}

impl SessionPersistence for SessionRepository {
    fn get(&self, session_id: &str) -> Result<Option<Session>, HearthError> {
        self.find_by_id(session_id)
    }

    fn put(&self, session: &Session) -> Result<(), HearthError> {
        self.save(session)
    }
}

fn row_to_session(row: &rusqlite::Row<'_>) -> Result<Session, HearthError> {
    let get_err = |e: rusqlite::Error| HearthError::Storage(e.to_string());

    let mode_str: String = row.get(2).map_err(get_err)?;
    let mode = DialogueMode::parse(&mode_str)
        .ok_or_else(|| HearthError::Storage(format!("Unknown dialogue mode: {}", mode_str)))?;

    let answers_json: String = row.get(3).map_err(get_err)?;
    let outcome_json: Option<String> = row.get(8).map_err(get_err)?;

    Ok(Session {
        session_id: row.get(0).map_err(get_err)?,
        schema_id: row.get(1).map_err(get_err)?,
        mode,
        answers: serde_json::from_str(&answers_json)?,
        cursor: row.get(4).map_err(get_err)?,
        completed: row.get::<_, i32>(5).map_err(get_err)? != 0,
        stalled_turns: row.get(6).map_err(get_err)?,
        grace_used: row.get::<_, i32>(7).map_err(get_err)? != 0,
        outcome: outcome_json
            .map(|json| serde_json::from_str(&json))
            .transpose()?,
        created_at: Timestamp(row.get(9).map_err(get_err)?),
        updated_at: Timestamp(row.get(10).map_err(get_err)?),
    })
}
