//! In-memory claim store
//!
//! Not durable. Used by tests and as a stand-in where persistence is not
//! wanted; write failures can be injected.

use async_trait::async_trait;
use dashmap::DashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::{claim_key, ClaimStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct MemoryClaimStore {
    claims: DashSet<String>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicU32,
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `has` call fail.
    pub fn with_failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Make every `mark_claimed` call fail.
    pub fn with_failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn contains(&self, recipient: &str, trigger: &str) -> bool {
        self.claims.contains(&claim_key(recipient, trigger))
    }

    /// Number of `mark_claimed` attempts, failed ones included.
    pub fn write_count(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[async_trait]
impl ClaimStore for MemoryClaimStore {
    async fn has(&self, recipient: &str, trigger: &str) -> Result<bool, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read failure injected".to_string()));
        }
        Ok(self.contains(recipient, trigger))
    }

    async fn mark_claimed(&self, recipient: &str, trigger: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write failure injected".to_string()));
        }
        self.claims.insert(claim_key(recipient, trigger));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryClaimStore::new().with_failing_writes();
        assert!(!store.has("alice", "src").await.unwrap());
        assert!(store.mark_claimed("alice", "src").await.is_err());
        assert_eq!(store.write_count(), 1);
        assert!(store.is_empty());

        let store = MemoryClaimStore::new().with_failing_reads();
        assert!(store.has("alice", "src").await.is_err());
    }
}
