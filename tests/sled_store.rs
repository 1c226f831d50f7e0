//! Claim persistence across reopen.

use prizebot::store::{ClaimStore, SledClaimStore};

#[tokio::test]
async fn test_claims_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("claims.sled");

    {
        let store = SledClaimStore::open(&path).unwrap();
        assert!(store.is_empty());
        store.mark_claimed("alice", "following").await.unwrap();
        store.mark_claimed("bob", "src").await.unwrap();
    }

    let store = SledClaimStore::open(&path).unwrap();
    assert_eq!(store.len(), 2);
    assert!(store.has("alice", "following").await.unwrap());
    assert!(store.has("bob", "src").await.unwrap());
    assert!(!store.has("alice", "leader").await.unwrap());
}

#[tokio::test]
async fn test_mark_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = SledClaimStore::open(dir.path().join("claims.sled")).unwrap();

    store.mark_claimed("alice", "proofs").await.unwrap();
    store.mark_claimed("alice", "proofs").await.unwrap();
    assert_eq!(store.len(), 1);
}
