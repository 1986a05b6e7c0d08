//! Owner-only administration: block and unblock.

use super::{CommandContext, CommandHandler, CommandRequest};
use crate::error::BotError;
use crate::identity::Identity;
use async_trait::async_trait;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Block,
    Unblock,
}

/// `.block` / `.unblock`: manage the block list. The admission
/// pipeline rejects non-owner callers before this handler runs, so a
/// block entry can only ever be written by the owner.
pub struct BlockCommand {
    mode: Mode,
}

impl BlockCommand {
    /// The `.block` variant.
    #[must_use]
    pub const fn block() -> Self {
        Self { mode: Mode::Block }
    }

    /// The `.unblock` variant.
    #[must_use]
    pub const fn unblock() -> Self {
        Self { mode: Mode::Unblock }
    }
}

#[async_trait]
impl CommandHandler for BlockCommand {
    fn names(&self) -> &'static [&'static str] {
        match self.mode {
            Mode::Block => &["block"],
            Mode::Unblock => &["unblock"],
        }
    }

    fn owner_only(&self) -> bool {
        true
    }

    fn min_args(&self) -> usize {
        1
    }

    fn usage(&self, prefix: &str) -> String {
        match self.mode {
            Mode::Block => {
                format!("🚫 Please specify an id to block!\n\n<b>Usage:</b> {prefix}block 1234567890")
            }
            Mode::Unblock => format!(
                "✅ Please specify an id to unblock!\n\n<b>Usage:</b> {prefix}unblock 1234567890"
            ),
        }
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        let target = Identity::canonicalize(&request.args[0]);
        let reply = match self.mode {
            Mode::Block => {
                ctx.auth.block(target.clone()).await;
                info!(user = %target, "blocked");
                &ctx.settings.messages.user_blocked
            }
            Mode::Unblock => {
                ctx.auth.unblock(&target).await;
                info!(user = %target, "unblocked");
                &ctx.settings.messages.user_unblocked
            }
        };
        ctx.reply(&request.conversation, reply).await;
        Ok(())
    }
}
