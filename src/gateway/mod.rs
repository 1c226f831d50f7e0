//! Chat gateway
//!
//! The messaging gateway owns the chat transport: it delivers inbound
//! messages, posts replies and reactions, publishes the command manifest,
//! and moves currency when it sees an in-chat payment message.

pub mod messages;
pub mod mock;
pub mod nats;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::GatewayError;
use crate::types::IncomingMessage;

pub use messages::{AdvertisedCommand, Advertisement};
pub use mock::{RecordingGateway, SentAction};
pub use nats::{NatsGateway, NatsGatewayConfig};

/// Inbound subscription. Read errors are items, not the end of the stream.
pub type MessageStream = BoxStream<'static, Result<IncomingMessage, GatewayError>>;

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Username the bot runs as
    fn username(&self) -> &str;

    /// Post a plain text message into a conversation.
    async fn send_text(&self, conversation_id: &str, body: &str) -> Result<(), GatewayError>;

    /// Post a message the gateway parses for in-chat payments.
    async fn send_payment(&self, conversation_id: &str, body: &str) -> Result<(), GatewayError>;

    /// React to a message.
    async fn react(
        &self,
        conversation_id: &str,
        message_id: u64,
        reaction: &str,
    ) -> Result<(), GatewayError>;

    /// Publish the public command manifest.
    async fn advertise(&self, advertisement: &Advertisement) -> Result<(), GatewayError>;

    /// Post into the bot's own conversation.
    async fn announce(&self, body: &str) -> Result<(), GatewayError>;

    /// Subscribe to new inbound messages.
    async fn listen(&self) -> Result<MessageStream, GatewayError>;
}
