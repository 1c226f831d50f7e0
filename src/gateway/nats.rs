//! NATS-backed chat gateway
//!
//! Inbound chat messages arrive as JSON on `{prefix}.inbound`. Outbound
//! actions are request/reply on `{prefix}.<action>` with a timeout, so a
//! send only counts once the gateway has acknowledged it.

use async_nats::{Client, ConnectOptions};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use super::messages::{
    AnnounceRequest, GatewayAck, ReactRequest, SendRequest, ADVERTISE, ANNOUNCE, INBOUND, PAY,
    REACT, SEND,
};
use super::{Advertisement, ChatGateway, MessageStream};
use crate::error::GatewayError;
use crate::types::IncomingMessage;

/// Default ping interval for keep-alive
const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(120);

/// NATS gateway configuration
#[derive(Debug, Clone)]
pub struct NatsGatewayConfig {
    pub nats_url: String,
    pub nats_user: Option<String>,
    pub nats_password: Option<String>,
    /// Subject prefix shared with the chat gateway
    pub subject_prefix: String,
    /// Username the bot runs as
    pub username: String,
    /// Timeout for each acknowledged request
    pub request_timeout: Duration,
}

impl Default for NatsGatewayConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://127.0.0.1:4222".to_string(),
            nats_user: None,
            nats_password: None,
            subject_prefix: "chat".to_string(),
            username: "prizebot".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl NatsGatewayConfig {
    pub fn subject(&self, action: &str) -> String {
        format!("{}.{}", self.subject_prefix, action)
    }
}

#[derive(Clone)]
pub struct NatsGateway {
    client: Client,
    config: NatsGatewayConfig,
}

impl NatsGateway {
    /// Connect to NATS
    pub async fn connect(config: NatsGatewayConfig) -> Result<Self, GatewayError> {
        info!("Connecting to NATS at {}", config.nats_url);

        let mut options = ConnectOptions::new()
            .name(format!("prizebot-{}", config.username))
            .ping_interval(DEFAULT_PING_INTERVAL)
            .connection_timeout(Duration::from_secs(5));

        if let (Some(user), Some(pass)) = (&config.nats_user, &config.nats_password) {
            options = options.user_and_password(user.clone(), pass.clone());
        }

        let client = options
            .connect(&config.nats_url)
            .await
            .map_err(|e| GatewayError::Nats(format!("Failed to connect: {}", e)))?;

        info!("Connected to NATS at {}", config.nats_url);
        Ok(Self { client, config })
    }

    /// Send a JSON request and wait for the gateway's acknowledgement.
    async fn request<T: Serialize>(&self, action: &str, body: &T) -> Result<(), GatewayError> {
        let subject = self.config.subject(action);
        let payload = Bytes::from(serde_json::to_vec(body)?);

        let reply = tokio::time::timeout(
            self.config.request_timeout,
            self.client.request(subject.clone(), payload),
        )
        .await
        .map_err(|_| GatewayError::Timeout(format!("Request to {} timed out", subject)))?
        .map_err(|e| GatewayError::Nats(format!("Request to {} failed: {}", subject, e)))?;

        let ack: GatewayAck = serde_json::from_slice(&reply.payload)?;
        if ack.ok {
            debug!(subject = %subject, "Gateway acknowledged");
            Ok(())
        } else {
            Err(GatewayError::Rejected(
                ack.error.unwrap_or_else(|| format!("{} rejected", subject)),
            ))
        }
    }
}

#[async_trait]
impl ChatGateway for NatsGateway {
    fn username(&self) -> &str {
        &self.config.username
    }

    async fn send_text(&self, conversation_id: &str, body: &str) -> Result<(), GatewayError> {
        self.request(
            SEND,
            &SendRequest {
                conversation_id: conversation_id.to_string(),
                body: body.to_string(),
            },
        )
        .await
    }

    async fn send_payment(&self, conversation_id: &str, body: &str) -> Result<(), GatewayError> {
        self.request(
            PAY,
            &SendRequest {
                conversation_id: conversation_id.to_string(),
                body: body.to_string(),
            },
        )
        .await
    }

    async fn react(
        &self,
        conversation_id: &str,
        message_id: u64,
        reaction: &str,
    ) -> Result<(), GatewayError> {
        self.request(
            REACT,
            &ReactRequest {
                conversation_id: conversation_id.to_string(),
                message_id,
                reaction: reaction.to_string(),
            },
        )
        .await
    }

    async fn advertise(&self, advertisement: &Advertisement) -> Result<(), GatewayError> {
        self.request(ADVERTISE, advertisement).await
    }

    async fn announce(&self, body: &str) -> Result<(), GatewayError> {
        self.request(
            ANNOUNCE,
            &AnnounceRequest {
                username: self.config.username.clone(),
                body: body.to_string(),
            },
        )
        .await
    }

    async fn listen(&self) -> Result<MessageStream, GatewayError> {
        let subject = self.config.subject(INBOUND);
        let subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .map_err(|e| GatewayError::Nats(format!("Subscribe failed: {}", e)))?;

        info!(subject = %subject, "Listening for chat messages");

        let stream = subscriber.map(|msg| {
            serde_json::from_slice::<IncomingMessage>(&msg.payload).map_err(GatewayError::from)
        });
        Ok(stream.boxed())
    }
}
