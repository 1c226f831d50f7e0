//! Gateway wire messages
//!
//! JSON bodies exchanged with the chat gateway over NATS. Every outbound
//! action is a request answered with a [`GatewayAck`].

use serde::{Deserialize, Serialize};

/// Subject suffix for inbound chat messages
pub const INBOUND: &str = "inbound";
/// Subject suffix for plain text sends
pub const SEND: &str = "send";
/// Subject suffix for in-chat payment sends
pub const PAY: &str = "pay";
/// Subject suffix for reactions
pub const REACT: &str = "react";
/// Subject suffix for the command manifest
pub const ADVERTISE: &str = "advertise";
/// Subject suffix for posts to the bot's own conversation
pub const ANNOUNCE: &str = "announce";

/// Text body sent into a conversation (plain or payment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    pub conversation_id: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactRequest {
    pub conversation_id: String,
    pub message_id: u64,
    pub reaction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnounceRequest {
    /// Bot username; the gateway resolves its own conversation
    pub username: String,
    pub body: String,
}

/// One advertised command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisedCommand {
    pub name: String,
    pub description: String,
}

/// Command manifest published at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertisement {
    pub alias: String,
    /// Who may see the commands ("public")
    pub visibility: String,
    pub commands: Vec<AdvertisedCommand>,
}

/// Gateway reply to any outbound request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayAck {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GatewayAck {
    pub fn ok() -> Self {
        Self { ok: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}
