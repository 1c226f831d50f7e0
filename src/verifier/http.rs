//! HTTP profile/proof provider client

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::parse;
use super::EligibilityVerifier;
use crate::error::VerifyError;
use crate::types::ProfileSnapshot;

/// Configuration for the HTTP verifier
#[derive(Debug, Clone)]
pub struct HttpVerifierConfig {
    /// Profile card endpoint, queried with `?username=<id>`
    pub profile_endpoint: String,
    /// Lookup endpoint, queried with `?username=<id>&fields=proofs_summary`
    pub proofs_endpoint: String,
    /// Bound on each request, connect through body
    pub request_timeout: Duration,
    /// Showcase identifier the profile must list
    pub showcase_team: String,
}

impl Default for HttpVerifierConfig {
    fn default() -> Self {
        Self {
            profile_endpoint: "https://keybase.io/_/api/1.0/user/card.json".to_string(),
            proofs_endpoint: "https://keybase.io/_/api/1.0/user/lookup.json".to_string(),
            request_timeout: Duration::from_secs(10),
            showcase_team: "citizenhacks.2019".to_string(),
        }
    }
}

pub struct HttpVerifier {
    config: HttpVerifierConfig,
    http_client: reqwest::Client,
}

impl HttpVerifier {
    pub fn new(config: HttpVerifierConfig) -> Result<Self, VerifyError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("prizebot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VerifyError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &HttpVerifierConfig {
        &self.config
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, VerifyError> {
        let response = self.http_client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| VerifyError::Decode(e.to_string()))
    }
}

#[async_trait]
impl EligibilityVerifier for HttpVerifier {
    async fn fetch_profile(&self, username: &str) -> Result<ProfileSnapshot, VerifyError> {
        let data = self
            .get_json(&self.config.profile_endpoint, &[("username", username)])
            .await?;
        let snapshot = parse::profile_snapshot(&data, &self.config.showcase_team);
        debug!(username = %username, ?snapshot, "Fetched profile");
        Ok(snapshot)
    }

    async fn fetch_proof_count(&self, username: &str) -> Result<u64, VerifyError> {
        let data = self
            .get_json(
                &self.config.proofs_endpoint,
                &[("username", username), ("fields", "proofs_summary")],
            )
            .await?;
        let count = parse::proof_count(&data);
        debug!(username = %username, count, "Fetched proof count");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpVerifierConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.profile_endpoint.ends_with("card.json"));
        assert!(HttpVerifier::new(config).is_ok());
    }
}
