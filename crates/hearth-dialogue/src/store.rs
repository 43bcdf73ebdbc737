//! Session store: serialized read-modify-write per session id.

use std::sync::Arc;

use tracing::debug;

use hearth_core::types::Session;
use hearth_storage::SessionPersistence;

use crate::error::DialogueError;
use crate::locks::KeyedLocks;
use crate::schema::Schema;

/// Session state behind per-session locks.
///
/// Every mutation goes through [`SessionStore::apply`], which holds the
/// session's lock across load, mutation and save. Different sessions
/// never contend.
pub struct SessionStore {
    persistence: Arc<dyn SessionPersistence>,
    locks: KeyedLocks,
}

impl SessionStore {
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        Self {
            persistence,
            locks: KeyedLocks::new(),
        }
    }

    /// Load a session, creating and saving a fresh one on first contact.
    pub async fn get_or_create(
        &self,
        session_id: &str,
        schema: &Schema,
    ) -> Result<Session, DialogueError> {
        let (session, ()) = self.apply(session_id, schema, |_| ()).await?;
        Ok(session)
    }

    /// Read a session without creating it.
    pub async fn get(&self, session_id: &str) -> Result<Option<Session>, DialogueError> {
        let _guard = self.locks.lock(session_id).await;
        Ok(self.persistence.get(session_id)?)
    }

    /// Run `mutation` on the session under its lock and persist the result.
    ///
    /// Returns a snapshot of the saved session and the mutation's value.
    /// Fails with [`DialogueError::DomainMismatch`] if the session was
    /// created for a different schema; nothing is written in that case.
    pub async fn apply<T, F>(
        &self,
        session_id: &str,
        schema: &Schema,
        mutation: F,
    ) -> Result<(Session, T), DialogueError>
    where
        F: FnOnce(&mut Session) -> T,
    {
        let _guard = self.locks.lock(session_id).await;

        let mut session = match self.persistence.get(session_id)? {
            Some(existing) => existing,
            None => {
                debug!(session_id = %session_id, schema = %schema.id, "Creating session");
                Session::new(session_id, schema.id.clone())
            }
        };

        if session.schema_id != schema.id {
            return Err(DialogueError::DomainMismatch {
                session_id: session_id.to_string(),
                expected: session.schema_id,
                requested: schema.id.clone(),
            });
        }

        let value = mutation(&mut session);
        session.touch();
        self.persistence.put(&session)?;
        Ok((session, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{bread_schema, recipe_schema};
    use hearth_storage::{Database, MemorySessions, SessionRepository};

    fn memory_store() -> SessionStore {
        SessionStore::new(Arc::new(MemorySessions::new()))
    }

    #[tokio::test]
    async fn test_get_or_create_creates_once() {
        let store = memory_store();
        let schema = bread_schema();
        let first = store.get_or_create("s1", &schema).await.unwrap();
        assert_eq!(first.schema_id, "bread");

        store
            .apply("s1", &schema, |s| {
                s.answers.insert("dietary".into(), "vegan".into());
            })
            .await
            .unwrap();

        let again = store.get_or_create("s1", &schema).await.unwrap();
        assert_eq!(again.answers["dietary"], "vegan");
        assert_eq!(again.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_get_does_not_create() {
        let store = memory_store();
        assert!(store.get("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_domain_mismatch_is_rejected() {
        let store = memory_store();
        store.get_or_create("s1", &bread_schema()).await.unwrap();
        let err = store
            .apply("s1", &recipe_schema(), |s| s.completed = true)
            .await
            .unwrap_err();
        assert!(matches!(err, DialogueError::DomainMismatch { .. }));
        assert!(!store.get("s1").await.unwrap().unwrap().completed);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = memory_store();
        let schema = bread_schema();
        store
            .apply("a", &schema, |s| {
                s.answers.insert("experience".into(), "expert".into());
            })
            .await
            .unwrap();
        let b = store.get_or_create("b", &schema).await.unwrap();
        assert!(b.answers.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mutations_all_persist() {
        let store = Arc::new(memory_store());
        let schema = Arc::new(bread_schema());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            let schema = Arc::clone(&schema);
            handles.push(tokio::spawn(async move {
                store
                    .apply("shared", &schema, move |s| {
                        s.answers.insert(format!("k{}", i), i.to_string());
                    })
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let session = store.get("shared").await.unwrap().unwrap();
        assert_eq!(session.answers.len(), 16);
    }

    #[tokio::test]
    async fn test_sqlite_backed_store() {
        let db = Arc::new(Database::in_memory().unwrap());
        let store = SessionStore::new(Arc::new(SessionRepository::new(db)));
        let schema = recipe_schema();
        store
            .apply("r1", &schema, |s| {
                s.answers.insert("servings".into(), "4".into());
            })
            .await
            .unwrap();
        let loaded = store.get("r1").await.unwrap().unwrap();
        assert_eq!(loaded.answers["servings"], "4");
    }
}
