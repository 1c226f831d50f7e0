//! Configuration for Prizebot
//!
//! CLI arguments and environment variable handling using clap.
//! Everything here is fixed for the lifetime of the process.

use clap::Parser;
use std::collections::HashSet;
use std::time::Duration;

use crate::engine::EngineConfig;
use crate::gateway::NatsGatewayConfig;
use crate::triggers::{RewardSettings, TriggerTable, DEFAULT_SOURCE_URL};
use crate::verifier::HttpVerifierConfig;

/// Prizebot - pays chat prizes for building out your profile
#[derive(Parser, Debug, Clone)]
#[command(name = "prizebot")]
#[command(about = "Chat-triggered prize bot")]
pub struct Args {
    /// Path of the durable claim store
    #[arg(long, env = "DB_PATH", default_value = "store.sled")]
    pub db_path: String,

    /// Comma-separated usernames allowed to pause and resume
    #[arg(long, env = "ADMINS", default_value = "")]
    pub admins: String,

    /// Team a profile must showcase for the leader and proofs prizes
    #[arg(long, env = "SHOWCASE_TEAM", default_value = "citizenhacks.2019")]
    pub showcase_team: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format (pretty, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Maximum messages handled concurrently
    #[arg(long, env = "MAX_CONCURRENT_HANDLERS", default_value = "16")]
    pub max_concurrent_handlers: usize,

    /// Skip messages the bot sent itself
    #[arg(
        long,
        env = "IGNORE_OWN_MESSAGES",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub ignore_own_messages: bool,

    /// Attempts at the claim write after a payment is confirmed
    #[arg(long, env = "CLAIM_WRITE_ATTEMPTS", default_value = "3")]
    pub claim_write_attempts: u32,

    /// Thresholds and prize amounts
    #[command(flatten)]
    pub rewards: RewardArgs,

    /// Profile and proof provider
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// NATS configuration
    #[command(flatten)]
    pub nats: NatsArgs,
}

/// Prize thresholds and amounts
#[derive(Parser, Debug, Clone)]
pub struct RewardArgs {
    /// Accounts a user must follow for the follower prize
    #[arg(long, env = "FOLLOWING_NEEDED", default_value = "25")]
    pub following_needed: u64,

    /// Followers a user must have for the leader prize
    #[arg(long, env = "FOLLOWERS_NEEDED", default_value = "25")]
    pub followers_needed: u64,

    /// Proofs a user must have for the proofs prize
    #[arg(long, env = "PROOFS_NEEDED", default_value = "5")]
    pub proofs_needed: u64,

    #[arg(long, env = "FOLLOWING_PRIZE", default_value = "20")]
    pub following_prize: u64,

    #[arg(long, env = "LEADER_PRIZE", default_value = "100")]
    pub leader_prize: u64,

    #[arg(long, env = "PROOFS_PRIZE", default_value = "50")]
    pub proofs_prize: u64,

    #[arg(long, env = "SOURCE_PRIZE", default_value = "100")]
    pub source_prize: u64,

    /// Currency code appended to payment amounts
    #[arg(long, env = "CURRENCY", default_value = "XLM")]
    pub currency: String,

    /// Source repository named in the help text; empty omits the line
    #[arg(long, env = "SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,
}

/// Profile provider endpoints
#[derive(Parser, Debug, Clone)]
pub struct ProviderArgs {
    /// Profile card endpoint
    #[arg(
        long,
        env = "PROFILE_ENDPOINT",
        default_value = "https://keybase.io/_/api/1.0/user/card.json"
    )]
    pub profile_endpoint: String,

    /// Proof lookup endpoint
    #[arg(
        long,
        env = "PROOFS_ENDPOINT",
        default_value = "https://keybase.io/_/api/1.0/user/lookup.json"
    )]
    pub proofs_endpoint: String,

    /// Provider request timeout in milliseconds
    #[arg(long, env = "PROVIDER_TIMEOUT_MS", default_value = "10000")]
    pub provider_timeout_ms: u64,
}

/// NATS connection configuration
#[derive(Parser, Debug, Clone)]
pub struct NatsArgs {
    /// NATS server URL
    #[arg(long, env = "NATS_URL", default_value = "nats://127.0.0.1:4222")]
    pub nats_url: String,

    /// NATS username (optional)
    #[arg(long, env = "NATS_USER")]
    pub nats_user: Option<String>,

    /// NATS password (optional)
    #[arg(long, env = "NATS_PASSWORD")]
    pub nats_password: Option<String>,

    /// Username the bot runs as
    #[arg(long, env = "BOT_USERNAME", default_value = "prizebot")]
    pub bot_username: String,

    /// Subject prefix shared with the chat gateway
    #[arg(long, env = "SUBJECT_PREFIX", default_value = "chat")]
    pub subject_prefix: String,

    /// Gateway request timeout in milliseconds
    #[arg(long, env = "GATEWAY_TIMEOUT_MS", default_value = "10000")]
    pub gateway_timeout_ms: u64,
}

impl Args {
    /// Parsed admin allow-list
    pub fn admin_set(&self) -> HashSet<String> {
        self.admins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn reward_settings(&self) -> RewardSettings {
        RewardSettings {
            following_needed: self.rewards.following_needed,
            followers_needed: self.rewards.followers_needed,
            proofs_needed: self.rewards.proofs_needed,
            following_prize: self.rewards.following_prize,
            leader_prize: self.rewards.leader_prize,
            proofs_prize: self.rewards.proofs_prize,
            source_prize: self.rewards.source_prize,
            currency: self.rewards.currency.clone(),
            showcase_team: self.showcase_team.clone(),
            source_url: Some(self.rewards.source_url.trim())
                .filter(|url| !url.is_empty())
                .map(str::to_string),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            triggers: TriggerTable::new(self.reward_settings()),
            admins: self.admin_set(),
            claim_write_attempts: self.claim_write_attempts,
            ignore_own_messages: self.ignore_own_messages,
            ..Default::default()
        }
    }

    pub fn verifier_config(&self) -> HttpVerifierConfig {
        HttpVerifierConfig {
            profile_endpoint: self.provider.profile_endpoint.clone(),
            proofs_endpoint: self.provider.proofs_endpoint.clone(),
            request_timeout: Duration::from_millis(self.provider.provider_timeout_ms),
            showcase_team: self.showcase_team.clone(),
        }
    }

    pub fn gateway_config(&self) -> NatsGatewayConfig {
        NatsGatewayConfig {
            nats_url: self.nats.nats_url.clone(),
            nats_user: self.nats.nats_user.clone(),
            nats_password: self.nats.nats_password.clone(),
            subject_prefix: self.nats.subject_prefix.clone(),
            username: self.nats.bot_username.clone(),
            request_timeout: Duration::from_millis(self.nats.gateway_timeout_ms),
        }
    }

    /// Use JSON log output
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_handlers == 0 {
            return Err("MAX_CONCURRENT_HANDLERS must be at least 1".to_string());
        }

        if self.claim_write_attempts == 0 {
            return Err("CLAIM_WRITE_ATTEMPTS must be at least 1".to_string());
        }

        if self.provider.provider_timeout_ms == 0 {
            return Err("PROVIDER_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.nats.gateway_timeout_ms == 0 {
            return Err("GATEWAY_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.nats.subject_prefix.trim().is_empty() {
            return Err("SUBJECT_PREFIX must not be empty".to_string());
        }

        if self.nats.bot_username.trim().is_empty() {
            return Err("BOT_USERNAME must not be empty".to_string());
        }

        match self.log_format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(format!("Unknown LOG_FORMAT {:?}, expected pretty or json", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["prizebot"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.db_path, "store.sled");
        assert_eq!(args.max_concurrent_handlers, 16);
        assert!(args.ignore_own_messages);
        assert_eq!(args.rewards.following_needed, 25);
        assert_eq!(args.rewards.currency, "XLM");
        assert_eq!(args.nats.subject_prefix, "chat");
        assert!(args.admin_set().is_empty());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_admin_set_trims_and_skips_blanks() {
        let args = parse(&["--admins", " alice, ,bob ,"]);
        let admins = args.admin_set();
        assert_eq!(admins.len(), 2);
        assert!(admins.contains("alice"));
        assert!(admins.contains("bob"));
    }

    #[test]
    fn test_derived_configs() {
        let args = parse(&[
            "--showcase-team",
            "rustconf.2026",
            "--leader-prize",
            "7",
            "--provider-timeout-ms",
            "250",
            "--bot-username",
            "tipbot",
            "--ignore-own-messages",
            "false",
        ]);

        let engine = args.engine_config();
        assert!(!engine.ignore_own_messages);
        assert_eq!(engine.triggers.showcase_team(), "rustconf.2026");
        assert_eq!(
            engine
                .triggers
                .reward(crate::triggers::TriggerId::Leader)
                .map(|r| r.amount),
            Some(7)
        );

        let verifier = args.verifier_config();
        assert_eq!(verifier.request_timeout, Duration::from_millis(250));
        assert_eq!(verifier.showcase_team, "rustconf.2026");

        assert_eq!(args.gateway_config().username, "tipbot");
    }

    #[test]
    fn test_source_url() {
        let args = parse(&[]);
        assert_eq!(
            args.reward_settings().source_url.as_deref(),
            Some(DEFAULT_SOURCE_URL)
        );
        let args = parse(&["--source-url", ""]);
        assert!(args.reward_settings().source_url.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        assert!(parse(&["--max-concurrent-handlers", "0"]).validate().is_err());
        assert!(parse(&["--claim-write-attempts", "0"]).validate().is_err());
        assert!(parse(&["--gateway-timeout-ms", "0"]).validate().is_err());
        assert!(parse(&["--subject-prefix", " "]).validate().is_err());
        assert!(parse(&["--log-format", "xml"]).validate().is_err());
    }
}
