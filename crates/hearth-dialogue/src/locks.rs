//! Per-key async locks.
//!
//! Each key gets its own `tokio::sync::Mutex`, so work on one session
//! never waits for another. Entries nobody holds are pruned as the map
//! grows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Guard for one key; the key is unlocked when it drops.
pub type KeyGuard = OwnedMutexGuard<()>;

/// Map size above which idle entries are pruned on insert.
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        self.slot(key).lock_owned().await
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &str) -> Arc<AsyncMutex<()>> {
        // The map is never left half-updated, so poisoning is recoverable.
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = locks.get(key) {
            return Arc::clone(slot);
        }
        if locks.len() >= PRUNE_THRESHOLD {
            // Only the map holds a reference to an idle entry.
            locks.retain(|_, slot| Arc::strong_count(slot) > 1);
        }
        let slot = Arc::new(AsyncMutex::new(()));
        locks.insert(key.to_string(), Arc::clone(&slot));
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let guard = locks.lock("a").await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.lock("a")).await;
        assert!(blocked.is_err());
        drop(guard);
        let free = tokio::time::timeout(Duration::from_millis(50), locks.lock("a")).await;
        assert!(free.is_ok());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waiters_run_one_at_a_time() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            handles.push(tokio::spawn(async move {
                let _g = locks.lock("shared").await;
                let n = inside.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                assert_eq!(n, 0);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let locks = KeyedLocks::new();
        let held = locks.lock("held").await;
        for i in 0..PRUNE_THRESHOLD {
            drop(locks.lock(&format!("k{}", i)).await);
        }
        // Crossing the threshold dropped every idle key except "held".
        drop(locks.lock("last").await);
        assert!(locks.len() < PRUNE_THRESHOLD);
        let still_held = tokio::time::timeout(Duration::from_millis(50), locks.lock("held")).await;
        assert!(still_held.is_err());
        drop(held);
    }
}
