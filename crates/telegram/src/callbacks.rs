//! Callback query handler for inline keyboard interactions

use crate::context::BotContext;
use crate::error::UserMessage;
use crate::navigation;
use crate::types::{CallbackInput, HandlerResult};
use teloxide::prelude::*;

/// Hand every button press to the navigation core
pub async fn handle_callback(q: CallbackQuery, ctx: BotContext) -> HandlerResult {
    let input = CallbackInput {
        id: q.id,
        user: q.from.id,
        data: q.data,
        origin: q.message.as_ref().map(|message| (message.chat.id, message.id)),
    };
    let callback_id = input.id.clone();

    match navigation::handle_callback(&ctx, input).await {
        Ok(transition) => {
            tracing::debug!(user = q.from.id.0, ?transition, "Handled callback");
        }
        Err(e) => {
            tracing::error!(user = q.from.id.0, "Callback failed: {}", e);
            ctx.transport
                .answer_callback(&callback_id, Some(e.user_message()), true)
                .await?;
        }
    }

    Ok(())
}
