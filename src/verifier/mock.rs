//! Static verifier for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::EligibilityVerifier;
use crate::error::VerifyError;
use crate::types::ProfileSnapshot;

/// Returns a configured profile and proof count, counting calls.
pub struct StaticVerifier {
    profile: Mutex<ProfileSnapshot>,
    proofs: Mutex<u64>,
    delay: Option<Duration>,
    failing: AtomicBool,
    profile_calls: AtomicU32,
    proof_calls: AtomicU32,
}

impl StaticVerifier {
    pub fn new(profile: ProfileSnapshot) -> Self {
        Self {
            profile: Mutex::new(profile),
            proofs: Mutex::new(0),
            delay: None,
            failing: AtomicBool::new(false),
            profile_calls: AtomicU32::new(0),
            proof_calls: AtomicU32::new(0),
        }
    }

    pub fn with_proofs(self, count: u64) -> Self {
        *self.proofs.lock().unwrap_or_else(|p| p.into_inner()) = count;
        self
    }

    /// Sleep before answering, to widen race windows in tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every call with a timeout.
    pub fn with_failure(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_profile(&self, profile: ProfileSnapshot) {
        *self.profile.lock().unwrap_or_else(|p| p.into_inner()) = profile;
    }

    pub fn profile_calls(&self) -> u32 {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn proof_calls(&self) -> u32 {
        self.proof_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> u32 {
        self.profile_calls() + self.proof_calls()
    }

    async fn pause(&self) -> Result<(), VerifyError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(VerifyError::Timeout("static verifier failure".to_string()));
        }
        Ok(())
    }
}

impl Default for StaticVerifier {
    fn default() -> Self {
        Self::new(ProfileSnapshot::default())
    }
}

#[async_trait]
impl EligibilityVerifier for StaticVerifier {
    async fn fetch_profile(&self, _username: &str) -> Result<ProfileSnapshot, VerifyError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await?;
        Ok(*self.profile.lock().unwrap_or_else(|p| p.into_inner()))
    }

    async fn fetch_proof_count(&self, _username: &str) -> Result<u64, VerifyError> {
        self.proof_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await?;
        Ok(*self.proofs.lock().unwrap_or_else(|p| p.into_inner()))
    }
}
