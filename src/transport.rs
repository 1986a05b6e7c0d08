//! Transport abstraction consumed by the core.
//!
//! The engine and command handlers only ever talk to this trait; the
//! concrete chat network (Telegram, in this build) lives behind it.
//! Every send is fire-and-forget from the core's perspective: failures
//! are surfaced as errors for the caller to log, never retried here.

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// Transport-level addressable chat context (direct or group). Opaque.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wraps a transport chat identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to an inbound message, used for reactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRef(pub String);

/// What kind of outbound attachment to send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// Photo with optional caption
    Image,
    /// Inline audio message
    Audio,
    /// Inline video message
    Video,
    /// File attachment with a filename
    Document,
}

/// An outbound media message.
#[derive(Clone, Debug)]
pub struct OutboundMedia {
    /// Attachment kind
    pub kind: MediaKind,
    /// Raw content
    pub content: Bytes,
    /// MIME type, e.g. `audio/mpeg`
    pub mime_type: String,
    /// Filename for document attachments
    pub file_name: Option<String>,
    /// Caption shown with the attachment
    pub caption: Option<String>,
}

/// Presence states the bot can signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// Online / reachable
    Available,
    /// Composing a text reply
    Typing,
    /// Recording a voice reply
    Recording,
}

/// A contact card for the creator-contact command.
#[derive(Clone, Debug)]
pub struct ContactCard {
    /// Name shown for the contact
    pub display_name: String,
    /// Phone number in international format
    pub phone_number: String,
    /// Full vCard payload
    pub vcard: String,
}

/// Outbound side of the chat transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a text message.
    async fn send_text(&self, conversation: &ConversationId, text: &str) -> Result<()>;

    /// Sends a media attachment.
    async fn send_media(&self, conversation: &ConversationId, media: OutboundMedia) -> Result<()>;

    /// Reacts to an inbound message with an emoji.
    async fn send_reaction(
        &self,
        conversation: &ConversationId,
        message: &MessageRef,
        emoji: &str,
    ) -> Result<()>;

    /// Updates presence, globally or for one conversation.
    async fn send_presence(
        &self,
        state: Presence,
        conversation: Option<&ConversationId>,
    ) -> Result<()>;

    /// Sends a contact card.
    async fn send_contact(&self, conversation: &ConversationId, card: ContactCard) -> Result<()>;
}
