//! Informational commands: menu, help, dev, alive, about.

use super::{CommandContext, CommandHandler, CommandRequest};
use crate::error::BotError;
use crate::providers::download_bytes;
use crate::transport::{ContactCard, MediaKind, OutboundMedia};
use crate::utils;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Timeout for fetching the menu image.
const MENU_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);
/// Size cap for the menu image.
const MENU_IMAGE_MAX_BYTES: u64 = 5 * 1024 * 1024;
/// Pause between the dev intro text and the contact card.
const DEV_CARD_DELAY: Duration = Duration::from_secs(1);

fn capability_listing(ctx: &CommandContext) -> String {
    let prefix = &ctx.settings.prefix;
    let contact = &ctx.settings.contact;
    format!(
        "🤖 <b>Aria Mini Command Menu</b>\n\n\
         🎵 <b>{prefix}song</b> [name] - Download songs\n\
         📹 <b>{prefix}video</b> [name] - Download videos\n\
         📱 <b>{prefix}apk</b> [app name] - Download APK files\n\
         🤖 <b>{prefix}aria</b> [question] - Ask AI questions\n\
         📞 <b>{prefix}dev</b> - Get creator contact\n\
         🔴 <b>{prefix}alive</b> - Check bot status\n\
         🆘 <b>{prefix}care</b> [problem] - Customer support\n\n\
         💡 <b>Usage Examples:</b>\n\
         • {prefix}song Shape of You\n\
         • {prefix}apk Signal\n\
         • {prefix}aria What is AI?\n\n\
         🛠️ <b>Created by {name}</b>\n\
         📧 {email}",
        name = contact.name,
        email = contact.email,
    )
}

/// `.menu`: capability listing, with an image when one is configured.
pub struct MenuCommand;

#[async_trait]
impl CommandHandler for MenuCommand {
    fn names(&self) -> &'static [&'static str] {
        &["menu"]
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        let listing = capability_listing(ctx);

        // Image is decoration; any failure falls back to plain text.
        if let Some(url) = &ctx.settings.media.menu_image_url {
            match download_bytes(&ctx.http, url, MENU_IMAGE_TIMEOUT, MENU_IMAGE_MAX_BYTES).await {
                Ok(bytes) => {
                    let media = OutboundMedia {
                        kind: MediaKind::Image,
                        content: bytes,
                        mime_type: "image/jpeg".to_owned(),
                        file_name: None,
                        caption: Some(listing.clone()),
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
                Err(error) => debug!(%error, "menu image unavailable"),
            }
        }

        ctx.reply(&request.conversation, &listing).await;
        Ok(())
    }
}

/// `.help` / `.commands`: full listing including owner commands.
pub struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    fn names(&self) -> &'static [&'static str] {
        &["help", "commands"]
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        let prefix = &ctx.settings.prefix;
        let text = format!(
            "{listing}\n\n\
             👑 <b>Owner Commands:</b>\n\
             • {prefix}block [id] - Block user\n\
             • {prefix}unblock [id] - Unblock user",
            listing = capability_listing(ctx),
        );
        ctx.reply(&request.conversation, &text).await;
        Ok(())
    }
}

/// `.dev`: creator intro followed by a contact card.
pub struct DevCommand;

#[async_trait]
impl CommandHandler for DevCommand {
    fn names(&self) -> &'static [&'static str] {
        &["dev"]
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        let contact = &ctx.settings.contact;
        ctx.reply(
            &request.conversation,
            &format!(
                "🛠️ I was created by <b>{name}</b>!\n\nHere's the contact information:",
                name = contact.name
            ),
        )
        .await;

        tokio::time::sleep(DEV_CARD_DELAY).await;

        let vcard = format!(
            "BEGIN:VCARD\n\
             VERSION:3.0\n\
             FN:{name}\n\
             ORG:Aria Labs\n\
             TITLE:Bot Creator & Developer\n\
             TEL;TYPE=CELL:{phone}\n\
             URL:https://github.com/{github}\n\
             EMAIL:{email}\n\
             END:VCARD",
            name = contact.name,
            phone = contact.phone,
            github = contact.github,
            email = contact.email,
        );
        let card = ContactCard {
            display_name: format!("{} - Bot Creator", contact.name),
            phone_number: contact.phone.clone(),
            vcard,
        };
        if let Err(error) = ctx.transport.send_contact(&request.conversation, card).await {
            debug!(%error, "failed to send contact card");
        }
        Ok(())
    }
}

/// `.alive`: uptime and status report.
pub struct AliveCommand;

#[async_trait]
impl CommandHandler for AliveCommand {
    fn names(&self) -> &'static [&'static str] {
        &["alive"]
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        let text = format!(
            "🤖 <b>Aria Mini Status</b>\n\n\
             ✅ Bot is alive and running!\n\
             ⏰ Uptime: {uptime}\n\
             🧠 AI Engine: {engine}\n\
             👨‍💻 Creator: {name}\n\
             📧 Support: {email}",
            uptime = utils::format_uptime(ctx.started_at.elapsed()),
            engine = ctx.settings.ai.engine,
            name = ctx.settings.contact.name,
            email = ctx.settings.contact.email,
        );
        ctx.reply(&request.conversation, &text).await;
        Ok(())
    }
}

/// `.about`: static bot description.
pub struct AboutCommand;

#[async_trait]
impl CommandHandler for AboutCommand {
    fn names(&self) -> &'static [&'static str] {
        &["about"]
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        ctx.reply(&request.conversation, &ctx.settings.messages.bot_info)
            .await;
        Ok(())
    }
}
