//! sled-backed claim store

use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use tracing::{debug, info};

use super::{claim_key, ClaimStore, CLAIM_SENTINEL};
use crate::error::StoreError;

/// Claim records in a single sled tree, keyed by `<recipient>:<trigger>`.
#[derive(Clone)]
pub struct SledClaimStore {
    db: Db,
}

impl SledClaimStore {
    /// Open or create the claim database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())?;
        info!(
            path = %path.as_ref().display(),
            claims = db.len(),
            recovered = db.was_recovered(),
            "Opened claim database"
        );
        Ok(Self { db })
    }

    /// Wrap an already-open database.
    pub fn from_db(db: Db) -> Self {
        Self { db }
    }

    /// Number of recorded claims
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Flush pending writes
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[async_trait]
impl ClaimStore for SledClaimStore {
    async fn has(&self, recipient: &str, trigger: &str) -> Result<bool, StoreError> {
        let key = claim_key(recipient, trigger);
        Ok(self.db.contains_key(key.as_bytes())?)
    }

    async fn mark_claimed(&self, recipient: &str, trigger: &str) -> Result<(), StoreError> {
        let key = claim_key(recipient, trigger);
        self.db.insert(key.as_bytes(), CLAIM_SENTINEL)?;
        // the claim is not durable until flushed
        self.db.flush_async().await?;
        debug!(key = %key, "Claim recorded");
        Ok(())
    }
}
