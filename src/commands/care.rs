//! `.care`: support tickets.

use super::{CommandContext, CommandHandler, CommandRequest, Feature};
use crate::error::BotError;
use crate::utils;
use async_trait::async_trait;

/// `.care`: file a support ticket, escalate it to the owner and echo
/// the ticket id back for correlation.
pub struct CareCommand;

#[async_trait]
impl CommandHandler for CareCommand {
    fn names(&self) -> &'static [&'static str] {
        &["care"]
    }

    fn feature(&self) -> Option<Feature> {
        Some(Feature::CustomerCare)
    }

    fn min_args(&self) -> usize {
        1
    }

    fn usage(&self, prefix: &str) -> String {
        format!("🆘 Please describe your problem!\n\n<b>Usage:</b> {prefix}care My bot is not responding")
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        let problem = request.args.join(" ");
        let ticket = ctx
            .notifier
            .file_ticket(request.identity.clone(), &request.display_name, &problem)
            .await;

        let acknowledgment = utils::fill(
            &ctx.settings.messages.care_submitted,
            &[
                ("{id}", &ticket.id.to_string()),
                ("{name}", &ctx.settings.contact.name),
            ],
        );
        ctx.reply(&request.conversation, &acknowledgment).await;
        Ok(())
    }
}
