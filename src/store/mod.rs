//! Duplicate-claim store
//!
//! A claim is the fact that a recipient has been paid a trigger's prize.
//! Presence of the key is the only semantic. The store does no locking of
//! its own; the engine serializes check-then-mark per claim key.

pub mod memory;
pub mod sled;

use async_trait::async_trait;

use crate::error::StoreError;

pub use self::memory::MemoryClaimStore;
pub use self::sled::SledClaimStore;

/// Opaque presence marker written for every claim.
pub const CLAIM_SENTINEL: &[u8] = b"sentinel";

/// Composite `<recipient>:<trigger>` key.
pub fn claim_key(recipient: &str, trigger: &str) -> String {
    format!("{}:{}", recipient, trigger)
}

#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Whether a claim exists. Absence is `Ok(false)`, not an error.
    async fn has(&self, recipient: &str, trigger: &str) -> Result<bool, StoreError>;

    /// Durably record a claim. Unconditional put.
    async fn mark_claimed(&self, recipient: &str, trigger: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_key() {
        assert_eq!(claim_key("alice", "following"), "alice:following");
    }
}
