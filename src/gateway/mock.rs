//! Recording gateway for testing.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{Advertisement, ChatGateway, MessageStream};
use crate::error::GatewayError;
use crate::types::IncomingMessage;

/// An outbound action the gateway was asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentAction {
    Text {
        conversation_id: String,
        body: String,
    },
    Payment {
        conversation_id: String,
        body: String,
    },
    Reaction {
        conversation_id: String,
        message_id: u64,
        reaction: String,
    },
    Advertisement(Advertisement),
    Announcement(String),
}

/// Records every outbound action; sends can be made to fail.
pub struct RecordingGateway {
    username: String,
    actions: Mutex<Vec<SentAction>>,
    inbound: Mutex<Option<MessageStream>>,
    fail_payments: AtomicBool,
    fail_reactions: AtomicBool,
}

impl RecordingGateway {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            actions: Mutex::new(Vec::new()),
            inbound: Mutex::new(None),
            fail_payments: AtomicBool::new(false),
            fail_reactions: AtomicBool::new(false),
        }
    }

    /// Messages `listen` will yield, in order, before the stream ends.
    pub fn with_inbound(self, items: Vec<Result<IncomingMessage, GatewayError>>) -> Self {
        self.set_inbound(stream::iter(items).boxed());
        self
    }

    pub fn set_inbound(&self, stream: MessageStream) {
        *self.inbound.lock().unwrap_or_else(|p| p.into_inner()) = Some(stream);
    }

    pub fn fail_payments(&self, fail: bool) {
        self.fail_payments.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reactions(&self, fail: bool) {
        self.fail_reactions.store(fail, Ordering::SeqCst);
    }

    pub fn actions(&self) -> Vec<SentAction> {
        self.actions.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn clear(&self) {
        self.actions.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }

    pub fn texts(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                SentAction::Text { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn payments(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                SentAction::Payment { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn reactions(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                SentAction::Reaction { reaction, .. } => Some(reaction),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: SentAction) {
        self.actions
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(action);
    }
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::new("prizebot")
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    fn username(&self) -> &str {
        &self.username
    }

    async fn send_text(&self, conversation_id: &str, body: &str) -> Result<(), GatewayError> {
        self.record(SentAction::Text {
            conversation_id: conversation_id.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn send_payment(&self, conversation_id: &str, body: &str) -> Result<(), GatewayError> {
        if self.fail_payments.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected("payment send failure injected".to_string()));
        }
        self.record(SentAction::Payment {
            conversation_id: conversation_id.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn react(
        &self,
        conversation_id: &str,
        message_id: u64,
        reaction: &str,
    ) -> Result<(), GatewayError> {
        if self.fail_reactions.load(Ordering::SeqCst) {
            return Err(GatewayError::Rejected("reaction failure injected".to_string()));
        }
        self.record(SentAction::Reaction {
            conversation_id: conversation_id.to_string(),
            message_id,
            reaction: reaction.to_string(),
        });
        Ok(())
    }

    async fn advertise(&self, advertisement: &Advertisement) -> Result<(), GatewayError> {
        self.record(SentAction::Advertisement(advertisement.clone()));
        Ok(())
    }

    async fn announce(&self, body: &str) -> Result<(), GatewayError> {
        self.record(SentAction::Announcement(body.to_string()));
        Ok(())
    }

    async fn listen(&self) -> Result<MessageStream, GatewayError> {
        let inbound = self.inbound.lock().unwrap_or_else(|p| p.into_inner()).take();
        Ok(inbound.unwrap_or_else(|| stream::empty().boxed()))
    }
}
