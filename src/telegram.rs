//! Telegram-backed [`Transport`] implementation.
//!
//! Wraps the Bot API client with automatic retry on transient network
//! failures (exponential backoff with jitter). Retrying lives here, in
//! the transport adapter; the core treats every send as fire-and-forget
//! and never retries on its own.

use crate::transport::{
    ContactCard, ConversationId, MediaKind, MessageRef, OutboundMedia, Presence, Transport,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, InputFile, MessageId, ParseMode, ReactionType};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use std::time::Duration;
use tracing::{trace, warn};

/// First backoff step for a failed API call.
const INITIAL_BACKOFF_MS: u64 = 200;
/// Backoff ceiling.
const MAX_BACKOFF_MS: u64 = 5_000;
/// Attempts after the first failure.
const MAX_RETRIES: usize = 3;

/// Retries a Bot API operation with exponential backoff and jitter.
async fn retry_send<F, Fut, T>(operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let strategy = ExponentialBackoff::from_millis(INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(MAX_BACKOFF_MS))
        .map(jitter)
        .take(MAX_RETRIES);

    Retry::spawn(strategy, operation).await.map_err(|error| {
        warn!(%error, "Telegram API operation failed after {MAX_RETRIES} retries");
        error
    })
}

/// Telegram Bot API transport.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Wraps a Bot API client.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn chat_id(conversation: &ConversationId) -> Result<ChatId> {
        conversation
            .as_str()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| anyhow!("not a Telegram chat id: {conversation}"))
    }

    fn message_id(message: &MessageRef) -> Result<MessageId> {
        message
            .0
            .parse::<i32>()
            .map(MessageId)
            .map_err(|_| anyhow!("not a Telegram message id: {}", message.0))
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, conversation: &ConversationId, text: &str) -> Result<()> {
        let chat = Self::chat_id(conversation)?;
        retry_send(|| async {
            self.bot
                .send_message(chat, text.to_owned())
                .parse_mode(ParseMode::Html)
                .await
                .map_err(|e| anyhow!("Telegram send error: {e}"))
        })
        .await?;
        Ok(())
    }

    async fn send_media(&self, conversation: &ConversationId, media: OutboundMedia) -> Result<()> {
        let chat = Self::chat_id(conversation)?;
        // Telegram infers the MIME type from content; the declared one is
        // only relevant for transports that carry it explicitly.
        trace!(mime = %media.mime_type, kind = ?media.kind, "sending media");

        retry_send(|| {
            let media = media.clone();
            async move {
                let mut file = InputFile::memory(media.content);
                if let Some(name) = media.file_name {
                    file = file.file_name(name);
                }
                let result = match media.kind {
                    MediaKind::Image => {
                        let mut request = self.bot.send_photo(chat, file);
                        if let Some(caption) = media.caption {
                            request = request.caption(caption).parse_mode(ParseMode::Html);
                        }
                        request.await
                    }
                    MediaKind::Audio => {
                        let mut request = self.bot.send_audio(chat, file);
                        if let Some(caption) = media.caption {
                            request = request.caption(caption).parse_mode(ParseMode::Html);
                        }
                        request.await
                    }
                    MediaKind::Video => {
                        let mut request = self.bot.send_video(chat, file);
                        if let Some(caption) = media.caption {
                            request = request.caption(caption).parse_mode(ParseMode::Html);
                        }
                        request.await
                    }
                    MediaKind::Document => {
                        let mut request = self.bot.send_document(chat, file);
                        if let Some(caption) = media.caption {
                            request = request.caption(caption).parse_mode(ParseMode::Html);
                        }
                        request.await
                    }
                };
                result.map(|_| ()).map_err(|e| anyhow!("Telegram media error: {e}"))
            }
        })
        .await
    }

    async fn send_reaction(
        &self,
        conversation: &ConversationId,
        message: &MessageRef,
        emoji: &str,
    ) -> Result<()> {
        let chat = Self::chat_id(conversation)?;
        let message_id = Self::message_id(message)?;

        // Reactions are a flourish; one attempt, no retry.
        self.bot
            .set_message_reaction(chat, message_id)
            .reaction(vec![ReactionType::Emoji {
                emoji: emoji.to_owned(),
            }])
            .await
            .map(|_| ())
            .map_err(|e| anyhow!("Telegram reaction error: {e}"))
    }

    async fn send_presence(
        &self,
        state: Presence,
        conversation: Option<&ConversationId>,
    ) -> Result<()> {
        let action = match state {
            Presence::Typing => ChatAction::Typing,
            Presence::Recording => ChatAction::RecordVoice,
            // Telegram bots have no global "online" presence.
            Presence::Available => {
                trace!("presence refresh is a no-op on Telegram");
                return Ok(());
            }
        };
        let Some(conversation) = conversation else {
            return Ok(());
        };
        let chat = Self::chat_id(conversation)?;

        self.bot
            .send_chat_action(chat, action)
            .await
            .map(|_| ())
            .map_err(|e| anyhow!("Telegram chat action error: {e}"))
    }

    async fn send_contact(&self, conversation: &ConversationId, card: ContactCard) -> Result<()> {
        let chat = Self::chat_id(conversation)?;
        retry_send(|| {
            let card = card.clone();
            async move {
                self.bot
                    .send_contact(chat, card.phone_number, card.display_name)
                    .vcard(card.vcard)
                    .await
                    .map(|_| ())
                    .map_err(|e| anyhow!("Telegram contact error: {e}"))
            }
        })
        .await
    }
}
