//! `.aria`: AI question answering.

use super::{CommandContext, CommandHandler, CommandRequest, Feature};
use crate::config::Messages;
use crate::error::BotError;
use crate::utils;
use async_trait::async_trait;

/// `.aria`: forward the question to the AI collaborator with the
/// configured persona prompt.
pub struct AskCommand;

#[async_trait]
impl CommandHandler for AskCommand {
    fn names(&self) -> &'static [&'static str] {
        &["aria"]
    }

    fn feature(&self) -> Option<Feature> {
        Some(Feature::Ai)
    }

    fn min_args(&self) -> usize {
        1
    }

    fn usage(&self, prefix: &str) -> String {
        format!(
            "🤖 Hi! I'm Aria Mini. Ask me a question!\n\n<b>Usage:</b> {prefix}aria What is AI?"
        )
    }

    fn failure_notice<'a>(&self, messages: &'a Messages) -> &'a str {
        &messages.api_error
    }

    async fn execute(
        &self,
        ctx: &CommandContext,
        request: &CommandRequest,
    ) -> Result<(), BotError> {
        let question = request.args.join(" ");
        ctx.reply(&request.conversation, "🤖 Thinking about your question...")
            .await;

        let prompt = format!(
            "{system}\n\nUser {name} asks: {question}",
            system = ctx.settings.ai.system_prompt,
            name = request.display_name,
        );
        let answer = ctx.ai.complete(&prompt, ctx.settings.ai_timeout()).await?;

        ctx.reply(&request.conversation, &utils::escape(&answer))
            .await;
        Ok(())
    }
}
