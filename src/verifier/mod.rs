//! Eligibility verifier
//!
//! Turns the external profile and proof providers into a [`ProfileSnapshot`]
//! and a proof count. Snapshots are fetched fresh for every check.

pub mod http;
pub mod mock;
pub mod parse;

use async_trait::async_trait;

use crate::error::VerifyError;
use crate::types::ProfileSnapshot;

pub use http::{HttpVerifier, HttpVerifierConfig};
pub use mock::StaticVerifier;

#[async_trait]
pub trait EligibilityVerifier: Send + Sync {
    async fn fetch_profile(&self, username: &str) -> Result<ProfileSnapshot, VerifyError>;

    async fn fetch_proof_count(&self, username: &str) -> Result<u64, VerifyError>;
}
