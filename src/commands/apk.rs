//! `.apk`: app lookup and package delivery.

use super::{CommandContext, CommandHandler, CommandRequest, Feature};
use crate::config::Messages;
use crate::error::BotError;
use crate::providers::{download_bytes, ProviderError};
use crate::transport::{MediaKind, OutboundMedia};
use crate::utils;
use async_trait::async_trait;
use tracing::warn;

/// Android package MIME type.
const APK_MIME: &str = "application/vnd.android.package-archive";

/// `.apk`: resolve an app by name and deliver the binary as a file.
pub struct ApkCommand;

#[async_trait]
impl CommandHandler for ApkCommand {
    fn names(&self) -> &'static [&'static str] {
        &["apk"]
    }

    fn feature(&self) -> Option<Feature> {
        Some(Feature::ApkDownloads)
    }

    fn min_args(&self) -> usize {
        1
    }

    fn usage(&self, prefix: &str) -> String {
        format!("📱 Please specify an app name!\n\n<b>Usage:</b> {prefix}apk Signal")
    }

    fn failure_notice<'a>(&self, messages: &'a Messages) -> &'a str {
        &messages.download_error
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        let app_name = request.args.join(" ");
        ctx.reply(
            &request.conversation,
            &format!(
                "🔍 Searching for APK: <b>{}</b>\nPlease wait...",
                utils::escape(&app_name)
            ),
        )
        .await;

        let package = ctx.app_lookup.lookup(&app_name).await.map_err(|error| {
            if matches!(error, ProviderError::NotFound) {
                BotError::NotFound {
                    subject: app_name.clone(),
                }
            } else {
                BotError::Upstream(error)
            }
        })?;

        let mut details = format!("📱 <b>{}</b>\n", utils::escape(&package.name));
        if let Some(version) = &package.version {
            details.push_str(&format!("Version: {}\n", utils::escape(version)));
        }
        if let Some(size) = &package.size {
            details.push_str(&format!("Size: {}\n", utils::escape(size)));
        }
        details.push_str("\n⬇️ Downloading APK file...");
        ctx.reply(&request.conversation, &details).await;

        let content = download_bytes(
            &ctx.http,
            &package.download_url,
            ctx.settings.download_timeout(),
            ctx.settings.downloads.max_file_size_bytes,
        )
        .await?;

        let caption = format!(
            "📱 <b>{name}</b>\n{version}\n✨ Downloaded by Aria Mini",
            name = utils::escape(&package.name),
            version = package
                .version
                .as_deref()
                .map(|v| format!("Version: {}\n", utils::escape(v)))
                .unwrap_or_default(),
        );
        let media = OutboundMedia {
            kind: MediaKind::Document,
            content,
            mime_type: APK_MIME.to_owned(),
            file_name: Some(utils::media_file_name(&package.name, "apk")),
            caption: Some(caption),
        };
        if let Err(error) = ctx.transport.send_media(&request.conversation, media).await {
            // The response itself failed; log and swallow.
            warn!(%error, app = %package.name, "failed to deliver APK");
            return Ok(());
        }

        ctx.react(request, "✅").await;
        Ok(())
    }
}
