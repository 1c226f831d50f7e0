//! Core data types shared across modules

use serde::{Deserialize, Serialize};

/// Content type tag of an inbound chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Join,
    #[serde(other)]
    Other,
}

/// A message received from the chat gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Sender username
    pub sender: String,
    /// Conversation the message was posted in
    pub conversation_id: String,
    /// Message identifier within the conversation
    pub message_id: u64,
    /// Content type tag
    pub content_type: ContentKind,
    /// Text body (present for text messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl IncomingMessage {
    /// Build a text message.
    pub fn text(
        sender: impl Into<String>,
        conversation_id: impl Into<String>,
        message_id: u64,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            conversation_id: conversation_id.into(),
            message_id,
            content_type: ContentKind::Text,
            body: Some(body.into()),
        }
    }

    /// Text body, if this is a text message that carries one.
    pub fn text_body(&self) -> Option<&str> {
        match self.content_type {
            ContentKind::Text => self.body.as_deref(),
            _ => None,
        }
    }
}

/// Point-in-time view of a user's public profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub num_followers: u64,
    pub num_following: u64,
    pub has_required_showcase: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_content_type_parses_as_other() {
        let msg: IncomingMessage = serde_json::from_str(
            r#"{"sender":"alice","conversation_id":"c1","message_id":7,"content_type":"reaction"}"#,
        )
        .unwrap();
        assert_eq!(msg.content_type, ContentKind::Other);
        assert!(msg.text_body().is_none());
    }

    #[test]
    fn test_text_body_only_for_text() {
        let mut msg = IncomingMessage::text("alice", "c1", 1, "help");
        assert_eq!(msg.text_body(), Some("help"));
        msg.content_type = ContentKind::Join;
        assert_eq!(msg.text_body(), None);
    }
}
