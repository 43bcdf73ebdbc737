//! Hearth storage crate - session persistence.
//!
//! Provides the [`SessionPersistence`] seam used by the dialogue engine,
//! an in-memory implementation, and a WAL-mode SQLite repository with
//! versioned migrations.

pub mod db;
pub mod memory;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use memory::MemorySessions;
pub use repository::SessionRepository;

use hearth_core::error::HearthError;
use hearth_core::types::Session;

/// Keyed session storage with read-your-writes semantics.
///
/// Implementations do not serialize concurrent writers; the dialogue
/// engine holds a per-session lock around every read-modify-write.
pub trait SessionPersistence: Send + Sync {
    fn get(&self, session_id: &str) -> Result<Option<Session>, HearthError>;
    fn put(&self, session: &Session) -> Result<(), HearthError>;
}
