//! In-process session storage.

use std::collections::HashMap;
use std::sync::Mutex;

use hearth_core::error::HearthError;
use hearth_core::types::Session;

use crate::SessionPersistence;

/// Sessions held in a map for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessions {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionPersistence for MemorySessions {
    fn get(&self, session_id: &str) -> Result<Option<Session>, HearthError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|e| HearthError::Storage(format!("session map poisoned: {}", e)))?;
        Ok(sessions.get(session_id).cloned())
    }

    fn put(&self, session: &Session) -> Result<(), HearthError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| HearthError::Storage(format!("session map poisoned: {}", e)))?;
        sessions.insert(session.session_id.clone(), session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_your_writes() {
        let store = MemorySessions::new();
        assert!(store.is_empty());
        assert!(store.get("a").unwrap().is_none());

        let mut session = Session::new("a", "bread");
        store.put(&session).unwrap();
        session.answers.insert("dietary".into(), "vegan".into());
        store.put(&session).unwrap();

        let found = store.get("a").unwrap().unwrap();
        assert_eq!(found.answers.get("dietary").map(String::as_str), Some("vegan"));
        assert_eq!(store.len(), 1);
    }
}
