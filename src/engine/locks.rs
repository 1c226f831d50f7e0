//! Per-claim mutual exclusion
//!
//! One async mutex per claim key, created on demand and dropped once no task
//! holds or waits on it. Serializes check-claim through mark-claimed for the
//! same recipient and trigger while leaving other keys independent.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct ClaimLocks {
    inner: DashMap<String, Arc<Mutex<()>>>,
}

impl ClaimLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> ClaimGuard<'_> {
        let mutex = Arc::clone(self.inner.entry(key.to_string()).or_default().value());
        let guard = mutex.lock_owned().await;
        ClaimGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Keys with a live lock entry.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Held for the duration of one claim attempt.
pub struct ClaimGuard<'a> {
    locks: &'a ClaimLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters clone the Arc under the shard lock, so a count of one here
        // means nobody else can reach this mutex.
        self.locks
            .inner
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_entry_removed_after_release() {
        let locks = ClaimLocks::new();
        {
            let _guard = locks.lock("alice:following").await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_key_is_serialized() {
        let locks = Arc::new(ClaimLocks::new());
        let inside = Arc::new(AtomicU32::new(0));
        let max_inside = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("alice:following").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = ClaimLocks::new();
        let _a = locks.lock("alice:following").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.lock("bob:following")).await;
        assert!(b.is_ok());
    }
}
