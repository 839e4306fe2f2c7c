//! Group searches and channel indexing

use crate::admin;
use crate::context::BotContext;
use crate::handlers;
use crate::navigation;
use crate::types::{GroupQuery, HandlerResult};
use teloxide::prelude::*;

/// Treat a plain group message as a catalog search
pub async fn group_search(msg: Message, ctx: BotContext) -> HandlerResult {
    let (Some(text), Some(user)) = (msg.text(), msg.from()) else {
        return Ok(());
    };

    let query = GroupQuery {
        chat: msg.chat.id,
        message: msg.id,
        user: user.id,
        text: text.to_string(),
    };
    let result = navigation::handle_group_query(&ctx, query).await;
    handlers::finish(&ctx, msg.chat.id, "search", result).await
}

/// Index media posted in a watched channel
pub async fn channel_post(msg: Message, ctx: BotContext) -> HandlerResult {
    let Some(record) = handlers::file_record_from_post(&msg) else {
        return Ok(());
    };

    if let Err(e) = admin::index_post(&ctx, record).await {
        tracing::error!(channel = msg.chat.id.0, message = msg.id.0, "Failed to index post: {}", e);
    }
    Ok(())
}
