//! Trigger engine
//!
//! Handles one inbound message end to end:
//!
//! 1. normalize and match the text against the trigger table
//! 2. admin commands: check the allow-list, flip the run state
//! 3. help: run-state gate, then the greeting
//! 4. prizes: run-state gate, claim lock, duplicate check, eligibility,
//!    threshold, then payment, claim write and reaction
//!
//! Every failure funnels into [`TriggerEngine::handle`], which classifies
//! it once and performs at most one reply action.

pub mod locks;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::{GatewayError, HandlerError, RejectionKind};
use crate::gateway::ChatGateway;
use crate::responses::{Category, Response, ResponseSelector};
use crate::run_state::RunState;
use crate::store::{claim_key, ClaimStore};
use crate::triggers::{
    normalize, AdminCommand, Requirement, RewardTrigger, TriggerId, TriggerKind, TriggerTable,
};
use crate::types::IncomingMessage;
use crate::verifier::EligibilityVerifier;

pub use locks::{ClaimGuard, ClaimLocks};

const PAUSED_MESSAGE: &str = "Sorry, I'm paused.";
const STARTUP_MESSAGE: &str = "I'm running.";

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub triggers: TriggerTable,
    /// Usernames allowed to pause and resume
    pub admins: HashSet<String>,
    /// Attempts at the durable claim write after a confirmed payment
    pub claim_write_attempts: u32,
    /// Backoff step between claim write attempts
    pub claim_retry_delay: Duration,
    /// Skip messages sent by the bot itself
    pub ignore_own_messages: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            triggers: TriggerTable::default(),
            admins: HashSet::new(),
            claim_write_attempts: 3,
            claim_retry_delay: Duration::from_millis(200),
            ignore_own_messages: true,
        }
    }
}

/// What handling a message amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing recognized; no reply
    Ignored,
    /// Prize paid and claim recorded
    Rewarded { trigger: TriggerId, amount: u64 },
    /// Help text sent
    Helped,
    /// Admin command applied
    RunStateChanged { running: bool },
    /// User-visible rejection sent
    Rejected(RejectionKind),
    /// Transient failure; generic reply sent
    Failed,
    /// Payment confirmed but the claim write failed
    ClaimNotRecorded,
}

pub struct TriggerEngine {
    config: EngineConfig,
    run_state: RunState,
    store: Arc<dyn ClaimStore>,
    verifier: Arc<dyn EligibilityVerifier>,
    gateway: Arc<dyn ChatGateway>,
    responses: ResponseSelector,
    locks: ClaimLocks,
}

impl TriggerEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn ClaimStore>,
        verifier: Arc<dyn EligibilityVerifier>,
        gateway: Arc<dyn ChatGateway>,
    ) -> Self {
        if config.admins.is_empty() {
            warn!("No admins configured, pause and resume are disabled");
        }
        Self {
            config,
            run_state: RunState::new(),
            store,
            verifier,
            gateway,
            responses: ResponseSelector::new(),
            locks: ClaimLocks::new(),
        }
    }

    /// Replace the response selector (e.g. with a seeded one).
    pub fn with_responses(mut self, responses: ResponseSelector) -> Self {
        self.responses = responses;
        self
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.config.triggers
    }

    /// Publish the command manifest and announce startup.
    pub async fn advertise(&self) -> Result<(), GatewayError> {
        let advertisement = self.config.triggers.advertisement(self.gateway.username());
        self.gateway.advertise(&advertisement).await?;
        info!(commands = advertisement.commands.len(), "Advertised commands");
        self.gateway.announce(STARTUP_MESSAGE).await
    }

    /// Handle one message. Never fails; the outcome reports what happened.
    pub async fn handle(&self, msg: &IncomingMessage) -> Outcome {
        let result = self.process(msg).await;
        self.respond(msg, result).await
    }

    async fn process(&self, msg: &IncomingMessage) -> Result<Outcome, HandlerError> {
        if self.config.ignore_own_messages && msg.sender == self.gateway.username() {
            return Err(HandlerError::Silent("own message".to_string()));
        }

        let Some(body) = msg.text_body() else {
            return Err(HandlerError::Silent(format!(
                "unhandled {:?} message",
                msg.content_type
            )));
        };

        match self.config.triggers.lookup(&normalize(body)) {
            Some(TriggerKind::Reward(reward)) => self.handle_reward(msg, reward).await,
            Some(TriggerKind::Admin(command)) => self.handle_admin(msg, command),
            Some(TriggerKind::Help) => self.handle_help(msg).await,
            None => Err(HandlerError::Silent(format!("unhandled text {:?}", body))),
        }
    }

    fn handle_admin(
        &self,
        msg: &IncomingMessage,
        command: AdminCommand,
    ) -> Result<Outcome, HandlerError> {
        debug!(sender = %msg.sender, ?command, "Handling admin request");

        if !self.config.admins.contains(&msg.sender) {
            return Err(HandlerError::Silent(format!(
                "{:?} request from non-admin {}",
                command, msg.sender
            )));
        }

        match command {
            AdminCommand::Pause => self.run_state.pause(),
            AdminCommand::Resume => self.run_state.resume(),
        }
        let running = self.run_state.is_running();
        info!(admin = %msg.sender, running, "Run state changed");
        Ok(Outcome::RunStateChanged { running })
    }

    async fn handle_help(&self, msg: &IncomingMessage) -> Result<Outcome, HandlerError> {
        self.ensure_running()?;

        let phrases = self.config.triggers.public_phrases();
        let suggestion = self
            .responses
            .choose(&phrases)
            .unwrap_or(TriggerId::Help.phrase());
        let help = self.config.triggers.help_text(suggestion);
        self.gateway.send_text(&msg.conversation_id, &help).await?;
        Ok(Outcome::Helped)
    }

    async fn handle_reward(
        &self,
        msg: &IncomingMessage,
        reward: &RewardTrigger,
    ) -> Result<Outcome, HandlerError> {
        let sender = msg.sender.as_str();
        let trigger = reward.id.key();
        debug!(sender = %sender, trigger = %trigger, "Handling prize request");

        self.ensure_running()?;

        let key = claim_key(sender, trigger);
        let _guard = self.locks.lock(&key).await;

        if self.store.has(sender, trigger).await? {
            debug!(key = %key, "Prize already claimed");
            return Err(self.duplicate_error());
        }

        self.check_eligibility(sender, reward).await?;

        // a pause may have landed while the provider was answering
        self.ensure_running()?;

        self.pay(msg, reward, &key).await
    }

    fn ensure_running(&self) -> Result<(), HandlerError> {
        if self.run_state.is_running() {
            Ok(())
        } else {
            Err(HandlerError::user_visible(RejectionKind::Paused, PAUSED_MESSAGE))
        }
    }

    fn duplicate_error(&self) -> HandlerError {
        let Response { message, reaction } = self.responses.select(Category::Duplicate);
        HandlerError::UserVisible {
            kind: RejectionKind::Duplicate,
            message,
            reaction,
        }
    }

    async fn check_eligibility(
        &self,
        sender: &str,
        reward: &RewardTrigger,
    ) -> Result<(), HandlerError> {
        let profile = if reward.needs_profile() {
            let profile = self.verifier.fetch_profile(sender).await?;
            debug!(sender = %sender, ?profile, "Found profile");
            if reward.needs_showcase && !profile.has_required_showcase {
                return Err(HandlerError::user_visible(
                    RejectionKind::MissingRequirement,
                    self.config.triggers.missing_showcase_text(),
                ));
            }
            profile
        } else {
            Default::default()
        };

        let observed = match reward.requirement {
            Requirement::None => return Ok(()),
            Requirement::Following { .. } => profile.num_following,
            Requirement::Followers { .. } => profile.num_followers,
            Requirement::Proofs { .. } => {
                let count = self.verifier.fetch_proof_count(sender).await?;
                debug!(sender = %sender, count, "Found proofs");
                count
            }
        };

        reward
            .requirement
            .check(observed)
            .map_err(|message| HandlerError::user_visible(RejectionKind::MissingRequirement, message))
    }

    /// Payment send, then claim write, then reaction. Called with the claim
    /// lock held.
    async fn pay(
        &self,
        msg: &IncomingMessage,
        reward: &RewardTrigger,
        key: &str,
    ) -> Result<Outcome, HandlerError> {
        let Response { message, reaction } = self.responses.select(Category::Success);
        let text = self
            .config
            .triggers
            .payment_text(&msg.sender, &message, reward.amount);

        info!(key = %key, amount = reward.amount, "Sending payment");
        debug!(text = %text, "Payment text");
        self.gateway.send_payment(&msg.conversation_id, &text).await?;

        self.record_claim(&msg.sender, reward.id.key(), key).await?;

        if let Some(reaction) = reaction {
            if let Err(e) = self
                .gateway
                .react(&msg.conversation_id, msg.message_id, &reaction)
                .await
            {
                warn!(key = %key, error = %e, "Payment reaction failed");
            }
        }

        Ok(Outcome::Rewarded {
            trigger: reward.id,
            amount: reward.amount,
        })
    }

    async fn record_claim(&self, sender: &str, trigger: &str, key: &str) -> Result<(), HandlerError> {
        let attempts = self.config.claim_write_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.store.mark_claimed(sender, trigger).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < attempts => {
                    warn!(key = %key, attempt, error = %e, "Claim write failed, retrying");
                    tokio::time::sleep(self.config.claim_retry_delay * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(HandlerError::ClaimNotRecorded {
                        key: key.to_string(),
                        source: e,
                    })
                }
            }
        }
    }

    /// The single classification point for handler results.
    async fn respond(&self, msg: &IncomingMessage, result: Result<Outcome, HandlerError>) -> Outcome {
        let err = match result {
            Ok(outcome) => return outcome,
            Err(err) => err,
        };

        match err {
            HandlerError::Silent(reason) => {
                debug!(sender = %msg.sender, reason = %reason, "Ignoring message");
                Outcome::Ignored
            }
            HandlerError::UserVisible {
                kind,
                message,
                reaction,
            } => {
                if let Err(e) = self.gateway.send_text(&msg.conversation_id, &message).await {
                    warn!(error = %e, "Unable to send reply");
                }
                if let Some(reaction) = reaction {
                    if let Err(e) = self
                        .gateway
                        .react(&msg.conversation_id, msg.message_id, &reaction)
                        .await
                    {
                        warn!(error = %e, "Unable to send reaction");
                    }
                }
                Outcome::Rejected(kind)
            }
            err @ HandlerError::ClaimNotRecorded { .. } => {
                // the user saw the payment; a retry would pay again
                error!(sender = %msg.sender, error = %err, "Payment sent but claim not recorded");
                Outcome::ClaimNotRecorded
            }
            err => {
                warn!(sender = %msg.sender, class = ?err.class(), error = %err, "Unable to complete request");
                let Response { message, .. } = self.responses.select(Category::GenericFailure);
                if let Err(e) = self.gateway.send_text(&msg.conversation_id, &message).await {
                    warn!(error = %e, "Unable to send reply");
                }
                Outcome::Failed
            }
        }
    }
}
