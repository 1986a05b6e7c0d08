//! Command table and admission pipeline.
//!
//! Inbound commands are matched by exact case-insensitive token
//! (prefix included) against a fixed handler table. Admission runs the
//! same pipeline for every handler (feature flag, then argument count,
//! then owner authorization), so the guards live in one place instead
//! of being repeated inside each command.

/// block / unblock
pub mod admin;
/// AI question answering
pub mod ai;
/// APK lookup and delivery
pub mod apk;
/// Support tickets
pub mod care;
/// menu, help, dev, alive, about
pub mod info;
/// Song/video search and the download-and-deliver protocol
pub mod media;

use crate::config::{Features, Messages, Settings};
use crate::error::BotError;
use crate::identity::{Auth, Identity};
use crate::interaction::InteractionTracker;
use crate::notify::OwnerNotifier;
use crate::providers::ai::AiCompletion;
use crate::providers::apps::AppLookup;
use crate::providers::media::{MediaFetch, MediaSearch};
use crate::store::EphemeralStore;
use crate::transport::{ConversationId, MessageRef, Transport};
use crate::utils;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Features a command can be gated on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    /// AI question answering
    Ai,
    /// Song/video downloads
    Downloads,
    /// APK downloads
    ApkDownloads,
    /// Support tickets
    CustomerCare,
}

impl Feature {
    /// Whether the switch for this feature is on.
    #[must_use]
    pub const fn is_enabled(self, features: &Features) -> bool {
        match self {
            Self::Ai => features.enable_ai,
            Self::Downloads => features.enable_downloads,
            Self::ApkDownloads => features.enable_apk_downloads,
            Self::CustomerCare => features.enable_customer_care,
        }
    }

    /// The fixed informational reply for the switched-off feature.
    #[must_use]
    pub fn disabled_notice(self, messages: &Messages) -> &str {
        match self {
            Self::Ai => &messages.ai_disabled,
            Self::Downloads => &messages.downloads_disabled,
            Self::ApkDownloads => &messages.apk_disabled,
            Self::CustomerCare => &messages.care_disabled,
        }
    }
}

/// One parsed inbound command. Transient; never stored.
#[derive(Clone, Debug)]
pub struct CommandRequest {
    /// Lowercased first token, prefix included
    pub token: String,
    /// Remaining whitespace-delimited arguments
    pub args: Vec<String>,
    /// Canonical caller identity
    pub identity: Identity,
    /// Conversation the command arrived in
    pub conversation: ConversationId,
    /// Caller display name for personalized replies
    pub display_name: String,
    /// Reference to the inbound message, for reactions
    pub message_ref: Option<MessageRef>,
}

impl CommandRequest {
    /// Splits a raw message into token and arguments. Returns `None`
    /// for blank input.
    #[must_use]
    pub fn parse(
        text: &str,
        identity: Identity,
        conversation: ConversationId,
        display_name: String,
        message_ref: Option<MessageRef>,
    ) -> Option<Self> {
        let mut parts = text.trim().split_whitespace();
        let token = parts.next()?.to_lowercase();
        let args = parts.map(str::to_owned).collect();
        Some(Self {
            token,
            args,
            identity,
            conversation,
            display_name,
            message_ref,
        })
    }
}

/// Shared services handed to every handler.
pub struct CommandContext {
    /// Startup settings
    pub settings: Arc<Settings>,
    /// Outbound transport
    pub transport: Arc<dyn Transport>,
    /// Shared ephemeral state
    pub store: EphemeralStore,
    /// Owner and block-list decisions
    pub auth: Auth,
    /// Pending download choices
    pub interactions: InteractionTracker,
    /// Owner escalation
    pub notifier: OwnerNotifier,
    /// Media search collaborator
    pub media_search: Arc<dyn MediaSearch>,
    /// Media fetch collaborator
    pub media_fetch: Arc<dyn MediaFetch>,
    /// App lookup collaborator
    pub app_lookup: Arc<dyn AppLookup>,
    /// AI completion collaborator
    pub ai: Arc<dyn AiCompletion>,
    /// Plain HTTP client for thumbnails and binary downloads
    pub http: reqwest::Client,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl CommandContext {
    /// Sends a text reply, logging and swallowing transport failures;
    /// a failed response must never abort message processing.
    pub async fn reply(&self, conversation: &ConversationId, text: &str) {
        if let Err(error) = self.transport.send_text(conversation, text).await {
            warn!(%error, %conversation, "failed to send reply");
        }
    }

    /// Best-effort emoji reaction to the inbound message.
    pub async fn react(&self, request: &CommandRequest, emoji: &str) {
        let Some(message) = &request.message_ref else {
            return;
        };
        if let Err(error) = self
            .transport
            .send_reaction(&request.conversation, message, emoji)
            .await
        {
            tracing::debug!(%error, "failed to react");
        }
    }
}

/// Contract every command implements. Admission metadata is declarative
/// so the registry can run the shared pipeline before `execute`.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Bare command names (without prefix) this handler answers to.
    fn names(&self) -> &'static [&'static str];

    /// Feature switch gating this command, if any.
    fn feature(&self) -> Option<Feature> {
        None
    }

    /// Whether only the owner identity may invoke this command.
    fn owner_only(&self) -> bool {
        false
    }

    /// Minimum number of arguments required.
    fn min_args(&self) -> usize {
        0
    }

    /// Usage hint sent when arguments are missing.
    fn usage(&self, prefix: &str) -> String {
        let _ = prefix;
        String::new()
    }

    /// Fixed reply for collaborator failures in this command.
    fn failure_notice<'a>(&self, messages: &'a Messages) -> &'a str {
        &messages.generic_error
    }

    /// Runs the command after admission passed.
    async fn execute(&self, ctx: &CommandContext, request: &CommandRequest)
        -> Result<(), BotError>;
}

/// Whether a token matched the command table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran (successfully or not; errors were converted to
    /// replies either way)
    Handled,
    /// No handler matched the token
    Unknown,
}

/// Fixed table of command handlers, keyed by full lowercase token.
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    /// Builds the standard catalog under the given prefix.
    #[must_use]
    pub fn standard(prefix: &str) -> Self {
        let catalog: Vec<Arc<dyn CommandHandler>> = vec![
            Arc::new(info::MenuCommand),
            Arc::new(info::HelpCommand),
            Arc::new(info::DevCommand),
            Arc::new(info::AliveCommand),
            Arc::new(info::AboutCommand),
            Arc::new(media::MediaSearchCommand::song()),
            Arc::new(media::MediaSearchCommand::video()),
            Arc::new(apk::ApkCommand),
            Arc::new(ai::AskCommand),
            Arc::new(admin::BlockCommand::block()),
            Arc::new(admin::BlockCommand::unblock()),
            Arc::new(care::CareCommand),
        ];

        let mut handlers = HashMap::new();
        for handler in catalog {
            for name in handler.names() {
                handlers.insert(format!("{prefix}{name}").to_lowercase(), handler.clone());
            }
        }
        Self { handlers }
    }

    /// Looks up and runs the handler for `request.token`.
    ///
    /// Every [`BotError`] is recovered here: mapped to its fixed reply
    /// and, for collaborator faults, logged with detail.
    pub async fn dispatch(&self, ctx: &CommandContext, request: &CommandRequest) -> DispatchOutcome {
        let Some(handler) = self.handlers.get(&request.token) else {
            return DispatchOutcome::Unknown;
        };

        if let Err(bot_error) = Self::admit_and_run(handler.as_ref(), ctx, request).await {
            if bot_error.is_fault() {
                error!(token = %request.token, error = %bot_error, "command failed");
                ctx.react(request, "❌").await;
            }
            let reply = Self::reply_for(handler.as_ref(), &ctx.settings.messages, &bot_error);
            ctx.reply(&request.conversation, &reply).await;
        }
        DispatchOutcome::Handled
    }

    async fn admit_and_run(
        handler: &dyn CommandHandler,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        if let Some(feature) = handler.feature() {
            if !feature.is_enabled(&ctx.settings.features) {
                return Err(BotError::FeatureDisabled {
                    notice: feature.disabled_notice(&ctx.settings.messages).to_owned(),
                });
            }
        }

        if request.args.len() < handler.min_args() {
            return Err(BotError::Validation {
                usage: handler.usage(&ctx.settings.prefix),
            });
        }

        if handler.owner_only() && !ctx.auth.is_owner(&request.identity) {
            return Err(BotError::Authorization);
        }

        handler.execute(ctx, request).await
    }

    fn reply_for(handler: &dyn CommandHandler, messages: &Messages, bot_error: &BotError) -> String {
        match bot_error {
            BotError::Validation { usage } => usage.clone(),
            BotError::Authorization => messages.owner_only.clone(),
            BotError::FeatureDisabled { notice } => notice.clone(),
            BotError::NotFound { subject } => {
                utils::fill(&messages.not_found, &[("{subject}", &utils::escape(subject))])
            }
            BotError::Upstream(_) => handler.failure_notice(messages).to_owned(),
            BotError::RateLimited => messages.rate_limited.clone(),
        }
    }
}
