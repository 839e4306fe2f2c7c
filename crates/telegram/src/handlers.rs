//! Shared glue between teloxide updates and the navigation core

use catalog::FileRecord;
use teloxide::types::{ChatId, Message};

use crate::context::BotContext;
use crate::error::{BotResult, UserMessage};
use crate::types::{HandlerResult, Transition};

/// Log the outcome of a core handler and report failures to `chat`.
///
/// Errors never escape to the dispatcher; the user sees a one-line message.
pub async fn finish(ctx: &BotContext, chat: ChatId, event: &str, result: BotResult<Transition>) -> HandlerResult {
    match result {
        Ok(transition) => {
            tracing::debug!(event, chat = chat.0, ?transition, "Handled update");
        }
        Err(e) => {
            tracing::error!(event, chat = chat.0, "Handler failed: {}", e);
            if let Err(send_err) = ctx.transport.send_text(chat, e.user_message(), None).await {
                tracing::warn!(chat = chat.0, "Could not report error: {}", send_err);
            }
        }
    }
    Ok(())
}

/// Reply with `text`, or the error's user message
pub async fn reply_outcome(ctx: &BotContext, msg: &Message, result: BotResult<String>) -> HandlerResult {
    let text = match result {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(chat = msg.chat.id.0, "Admin command failed: {}", e);
            e.user_message()
        }
    };
    ctx.transport.reply_text(msg.chat.id, msg.id, text, None).await?;
    Ok(())
}

/// Catalog entry for a channel post carrying a document or a video
pub fn file_record_from_post(msg: &Message) -> Option<FileRecord> {
    let (file_id, file_name) = if let Some(document) = msg.document() {
        (&document.file.id, document.file_name.as_deref())
    } else if let Some(video) = msg.video() {
        (&video.file.id, video.file_name.as_deref())
    } else {
        return None;
    };

    record_from_parts(file_id, file_name, msg.caption(), msg.chat.id.0, msg.id.0)
}

/// Build a record from the pieces of a media post.
///
/// Posts without a file name fall back to the first caption line; posts
/// with neither are skipped.
pub fn record_from_parts(
    file_id: &str,
    file_name: Option<&str>,
    caption: Option<&str>,
    chat: i64,
    message: i32,
) -> Option<FileRecord> {
    let caption = caption.unwrap_or("");
    let name = file_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| caption.lines().map(str::trim).find(|line| !line.is_empty()))?;

    Some(FileRecord::new(file_id, name, chat, message, caption))
}
