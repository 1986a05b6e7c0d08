//! Song and video commands, plus the download-and-deliver protocol.
//!
//! A successful search opens a pending format choice; the follow-up
//! reply (resolved by the engine) lands in [`deliver_pending`], which
//! fetches the binary and attaches it in the chosen format. Every
//! failure path sends exactly one fixed notice, and the pending record
//! is gone either way, since it was consumed before delivery started.

use super::{CommandContext, CommandHandler, CommandRequest, Feature};
use crate::config::Messages;
use crate::error::BotError;
use crate::interaction::{DeliveryFormat, PendingInteraction, PendingKind};
use crate::providers::download_bytes;
use crate::providers::media::{FetchKind, ResolvedMedia};
use crate::transport::{ConversationId, MediaKind, MessageRef, OutboundMedia};
use crate::utils;
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout for fetching a result thumbnail.
const THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(10);
/// Size cap for a result thumbnail.
const THUMBNAIL_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// `.song` / `.video`: search and offer a format choice.
pub struct MediaSearchCommand {
    kind: PendingKind,
}

impl MediaSearchCommand {
    /// The `.song` variant.
    #[must_use]
    pub const fn song() -> Self {
        Self {
            kind: PendingKind::Song,
        }
    }

    /// The `.video` variant.
    #[must_use]
    pub const fn video() -> Self {
        Self {
            kind: PendingKind::Video,
        }
    }

    const fn emoji(&self) -> &'static str {
        match self.kind {
            PendingKind::Song => "🎵",
            PendingKind::Video => "📹",
        }
    }

    const fn inline_label(&self) -> &'static str {
        match self.kind {
            PendingKind::Song => "Audio Format",
            PendingKind::Video => "Video Format",
        }
    }
}

#[async_trait]
impl CommandHandler for MediaSearchCommand {
    fn names(&self) -> &'static [&'static str] {
        match self.kind {
            PendingKind::Song => &["song"],
            PendingKind::Video => &["video"],
        }
    }

    fn feature(&self) -> Option<Feature> {
        Some(Feature::Downloads)
    }

    fn min_args(&self) -> usize {
        1
    }

    fn usage(&self, prefix: &str) -> String {
        match self.kind {
            PendingKind::Song => {
                format!("🎵 Please specify a song name!\n\n<b>Usage:</b> {prefix}song Shape of You")
            }
            PendingKind::Video => {
                format!("📹 Please specify a video name!\n\n<b>Usage:</b> {prefix}video Despacito")
            }
        }
    }

    fn failure_notice<'a>(&self, messages: &'a Messages) -> &'a str {
        &messages.download_error
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        let query = request.args.join(" ");
        ctx.reply(
            &request.conversation,
            &format!(
                "🔍 Searching for: <b>{}</b>\nPlease wait...",
                utils::escape(&query)
            ),
        )
        .await;

        let hit = ctx
            .media_search
            .search(&query)
            .await?
            .ok_or(BotError::NotFound { subject: query })?;

        ctx.interactions
            .open(PendingInteraction {
                conversation: request.conversation.clone(),
                identity: request.identity.clone(),
                subject_url: hit.url.clone(),
                title: hit.title.clone(),
                kind: self.kind,
                created_at: Utc::now(),
            })
            .await;

        let prompt = format!(
            "{emoji} <b>{title}</b>\nDuration: {duration}\n\n\
             📱 <b>Reply with:</b>\n\
             • <b>1</b> - {inline}\n\
             • <b>2</b> - Document Format\n\n\
             ⏰ <i>Download expires in 5 minutes</i>",
            emoji = self.emoji(),
            title = utils::escape(&hit.title),
            duration = utils::escape(&hit.duration),
            inline = self.inline_label(),
        );

        // Thumbnail is decoration; fall back to plain text on any failure.
        if let Some(thumbnail) = &hit.thumbnail {
            match download_bytes(&ctx.http, thumbnail, THUMBNAIL_TIMEOUT, THUMBNAIL_MAX_BYTES).await
            {
                Ok(bytes) => {
                    let media = OutboundMedia {
                        kind: MediaKind::Image,
                        content: bytes,
                        mime_type: "image/jpeg".to_owned(),
                        file_name: None,
                        caption: Some(prompt.clone()),
                    };
                    if ctx
                        .transport
                        .send_media(&request.conversation, media)
                        .await
                        .is_ok()
                    {
                        return Ok(());
                    }
                }
                Err(error) => debug!(%error, "thumbnail unavailable"),
            }
        }

        ctx.reply(&request.conversation, &prompt).await;
        Ok(())
    }
}

fn outbound_for(
    kind: PendingKind,
    format: DeliveryFormat,
    resolved: &ResolvedMedia,
    content: bytes::Bytes,
) -> OutboundMedia {
    let title = utils::escape(&resolved.title);
    let duration = utils::escape(&resolved.duration);
    match (kind, format) {
        (PendingKind::Song, DeliveryFormat::Inline) => OutboundMedia {
            kind: MediaKind::Audio,
            content,
            mime_type: "audio/mpeg".to_owned(),
            file_name: None,
            caption: Some(format!("🎵 <b>{title}</b>")),
        },
        (PendingKind::Song, DeliveryFormat::Document) => OutboundMedia {
            kind: MediaKind::Document,
            content,
            mime_type: "audio/mpeg".to_owned(),
            file_name: Some(utils::media_file_name(&resolved.title, "mp3")),
            caption: Some(format!(
                "🎵 <b>{title}</b>\n⏰ Duration: {duration}\n\n✨ Downloaded by Aria Mini"
            )),
        },
        (PendingKind::Video, DeliveryFormat::Inline) => OutboundMedia {
            kind: MediaKind::Video,
            content,
            mime_type: "video/mp4".to_owned(),
            file_name: None,
            caption: Some(format!("📹 <b>{title}</b>")),
        },
        (PendingKind::Video, DeliveryFormat::Document) => OutboundMedia {
            kind: MediaKind::Document,
            content,
            mime_type: "video/mp4".to_owned(),
            file_name: Some(utils::media_file_name(&resolved.title, "mp4")),
            caption: Some(format!(
                "📹 <b>{title}</b>\n⏰ Duration: {duration}\n\n✨ Downloaded by Aria Mini"
            )),
        },
    }
}

/// Runs the download-and-deliver protocol for a consumed pending choice.
///
/// The pending record was already removed by the resolver, so a failure
/// here leaves no residual state, only the single fixed notice.
pub async fn deliver_pending(
    ctx: &CommandContext,
    conversation: &ConversationId,
    message: Option<&MessageRef>,
    pending: PendingInteraction,
    format: DeliveryFormat,
) {
    let react = |emoji: &'static str| async move {
        if let Some(message) = message {
            if let Err(error) = ctx.transport.send_reaction(conversation, message, emoji).await {
                debug!(%error, "failed to react");
            }
        }
    };

    react("⬇️").await;
    ctx.reply(
        conversation,
        &format!(
            "⬇️ Downloading <b>{}</b>...\n\nPlease wait, this may take a moment...",
            utils::escape(&pending.title)
        ),
    )
    .await;

    let fetch_kind = match pending.kind {
        PendingKind::Song => FetchKind::Audio,
        PendingKind::Video => FetchKind::Video,
    };

    let delivered = async {
        let resolved = ctx
            .media_fetch
            .fetch(&pending.subject_url, fetch_kind)
            .await?;
        let content = download_bytes(
            &ctx.http,
            &resolved.download_url,
            ctx.settings.download_timeout(),
            ctx.settings.downloads.max_file_size_bytes,
        )
        .await?;
        Ok::<_, crate::providers::ProviderError>((resolved, content))
    }
    .await;

    match delivered {
        Ok((resolved, content)) => {
            let media = outbound_for(pending.kind, format, &resolved, content);
            if let Err(error) = ctx.transport.send_media(conversation, media).await {
                // The response itself failed; log and swallow.
                warn!(%error, title = %pending.title, "failed to deliver media");
                react("❌").await;
                return;
            }
            react("✅").await;
        }
        Err(error) => {
            warn!(%error, title = %pending.title, "download failed");
            ctx.reply(conversation, &ctx.settings.messages.download_error)
                .await;
            react("❌").await;
        }
    }
}
