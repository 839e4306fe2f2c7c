//! Administrator commands; the schema only routes them for the admin

use crate::admin;
use crate::constants::{emoji, usage};
use crate::context::BotContext;
use crate::error::UserMessage;
use crate::handlers;
use crate::types::HandlerResult;
use teloxide::prelude::*;

pub async fn stats(msg: Message, ctx: BotContext) -> HandlerResult {
    let result = admin::stats_text(&ctx).await;
    handlers::reply_outcome(&ctx, &msg, result).await
}

pub async fn index(msg: Message, ctx: BotContext, arg: String) -> HandlerResult {
    if arg.trim().is_empty() {
        ctx.transport
            .reply_text(msg.chat.id, msg.id, usage::INDEX.to_string(), None)
            .await?;
        return Ok(());
    }

    let result = admin::index_channel(&ctx, &arg).await;
    handlers::reply_outcome(&ctx, &msg, result).await
}

/// Relay the replied-to message to every user
pub async fn broadcast(msg: Message, ctx: BotContext) -> HandlerResult {
    let Some(source) = msg.reply_to_message() else {
        ctx.transport
            .reply_text(msg.chat.id, msg.id, usage::BROADCAST.to_string(), None)
            .await?;
        return Ok(());
    };

    let status = ctx
        .transport
        .reply_text(msg.chat.id, msg.id, format!("{} Broadcasting...", emoji::BROADCAST), None)
        .await?;

    let text = match admin::run_broadcast(&ctx, msg.chat.id, source.id).await {
        Ok(tally) => admin::broadcast_report(&tally),
        Err(e) => {
            tracing::error!("Broadcast failed: {}", e);
            e.user_message()
        }
    };
    ctx.transport.edit_text(msg.chat.id, status, text, None).await?;
    Ok(())
}
