//! Basic bot commands (start, help)

use crate::context::BotContext;
use crate::handlers;
use crate::navigation;
use crate::types::{Command, HandlerResult};
use teloxide::{prelude::*, utils::command::BotCommands};

/// Greeting and main menu, private chats only
pub async fn start(msg: Message, ctx: BotContext) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let result = navigation::handle_start(&ctx, msg.chat.id, user.id, &user.first_name).await;
    handlers::finish(&ctx, msg.chat.id, "start", result).await
}

/// Display help message with available commands
pub async fn help(msg: Message, ctx: BotContext) -> HandlerResult {
    ctx.transport
        .send_text(msg.chat.id, Command::descriptions().to_string(), None)
        .await?;
    Ok(())
}
