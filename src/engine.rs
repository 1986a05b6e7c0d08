//! Inbound-event pipeline.
//!
//! Each inbound message runs, in order: block-list check, rate-limit
//! admission, pending-reply resolution (non-prefixed text only), then
//! command dispatch. One task per event; all shared state lives in the
//! ephemeral store, so interleaved handlers stay consistent per key.

use crate::commands::{self, CommandContext, CommandRegistry, CommandRequest, DispatchOutcome};
use crate::identity::Identity;
use crate::rate_limit::RateLimiter;
use crate::transport::{ConversationId, MessageRef, Presence};
use std::time::Duration;
use tracing::debug;

/// How long the post-command "recording" flourish lasts.
const RECORDING_FLOURISH: Duration = Duration::from_secs(1);

/// One inbound text event, as delivered by the transport adapter.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// Conversation the message arrived in
    pub conversation: ConversationId,
    /// Raw sender identifier, possibly with a transport suffix
    pub sender: String,
    /// Sender display name, when the transport provides one
    pub display_name: Option<String>,
    /// Message text
    pub text: String,
    /// Reference for reactions, when the transport provides one
    pub message_ref: Option<MessageRef>,
}

/// The message-dispatch engine. One instance per process, shared across
/// per-event tasks.
pub struct Engine {
    ctx: CommandContext,
    registry: CommandRegistry,
    rate: RateLimiter,
}

impl Engine {
    /// Wires the engine from a ready command context.
    #[must_use]
    pub fn new(ctx: CommandContext) -> Self {
        let registry = CommandRegistry::standard(&ctx.settings.prefix);
        let rate = RateLimiter::new(
            ctx.store.clone(),
            ctx.auth.owner().clone(),
            ctx.settings.rate_limit_max,
            ctx.settings.rate_window(),
            ctx.settings.features.enable_rate_limiting,
        );
        Self {
            ctx,
            registry,
            rate,
        }
    }

    /// Shared services, exposed for bootstrap tasks (startup
    /// notification, presence loop).
    #[must_use]
    pub const fn context(&self) -> &CommandContext {
        &self.ctx
    }

    /// Processes one inbound message to completion. Never returns an
    /// error: every failure is converted to a reply or a log line.
    pub async fn handle_inbound(&self, inbound: InboundMessage) {
        let text = inbound.text.trim();
        if text.is_empty() {
            return;
        }

        let identity = Identity::canonicalize(&inbound.sender);
        let display_name = inbound
            .display_name
            .clone()
            .unwrap_or_else(|| identity.to_string());

        if self.ctx.settings.features.enable_blacklist && self.ctx.auth.is_blocked(&identity).await
        {
            debug!(user = %identity, "dropping message from blocked user");
            return;
        }

        if !self.rate.admit(&identity).await {
            self.ctx
                .reply(&inbound.conversation, &self.ctx.settings.messages.rate_limited)
                .await;
            return;
        }

        if !text.starts_with(self.ctx.settings.prefix.as_str()) {
            // A non-prefixed message may be the follow-up to an open
            // format choice; anything else is silently dropped.
            if let Some((pending, format)) = self
                .ctx
                .interactions
                .resolve(&inbound.conversation, &identity, text)
                .await
            {
                commands::media::deliver_pending(
                    &self.ctx,
                    &inbound.conversation,
                    inbound.message_ref.as_ref(),
                    pending,
                    format,
                )
                .await;
            }
            return;
        }

        let Some(request) = CommandRequest::parse(
            text,
            identity,
            inbound.conversation.clone(),
            display_name,
            inbound.message_ref.clone(),
        ) else {
            return;
        };

        tokio::time::sleep(self.ctx.settings.response_delay()).await;
        self.ctx.react(&request, "⚡").await;

        match self.registry.dispatch(&self.ctx, &request).await {
            DispatchOutcome::Handled => {
                if self.ctx.settings.media.auto_recording {
                    self.recording_flourish(&inbound.conversation).await;
                }
            }
            DispatchOutcome::Unknown => {
                debug!(token = %request.token, "unknown command");
            }
        }
    }

    /// Brief "recording" presence after a handled command. Pure
    /// decoration; failures are swallowed.
    async fn recording_flourish(&self, conversation: &ConversationId) {
        let transport = &self.ctx.transport;
        if let Err(error) = transport
            .send_presence(Presence::Recording, Some(conversation))
            .await
        {
            debug!(%error, "presence update failed");
            return;
        }
        tokio::time::sleep(RECORDING_FLOURISH).await;
        if let Err(error) = transport
            .send_presence(Presence::Available, Some(conversation))
            .await
        {
            debug!(%error, "presence update failed");
        }
    }
}
