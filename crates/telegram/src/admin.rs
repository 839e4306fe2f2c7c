//! Administrator operations behind `/stats`, `/index` and `/broadcast`

use catalog::FileRecord;
use teloxide::types::{ChatId, MessageId};

use crate::broadcast::{broadcast, BroadcastTally};
use crate::constants::emoji;
use crate::context::BotContext;
use crate::error::{BotError, BotResult};
use crate::utils;

/// Live counters shown by `/stats` and the admin panel
pub async fn stats_text(ctx: &BotContext) -> BotResult<String> {
    let users = ctx.catalog.count_users().await?;
    let files = ctx.catalog.count_files().await?;

    Ok(format!(
        "{} Bot Statistics\n\n\
         👥 Users: {}\n\
         📁 Files: {}\n\
         🔑 Live sessions: {}\n\n\
         🟢 Bot Status: Running",
        emoji::INFO,
        users,
        files,
        ctx.sessions.len()
    ))
}

/// Add the channel named by `arg` to the index set
pub async fn index_channel(ctx: &BotContext, arg: &str) -> BotResult<String> {
    let channel = utils::parse_chat_id(arg)
        .map(ChatId)
        .map_err(BotError::InvalidArguments)?;

    let added = ctx.watch_channel(channel);
    let files = ctx.catalog.count_files().await?;

    if !added {
        return Ok(format!(
            "{} Channel {} is already indexed.\n📁 Files in catalog: {}",
            emoji::SEARCH,
            channel.0,
            files
        ));
    }

    tracing::info!(channel = channel.0, "Channel added to the index set");
    ctx.admin_log
        .record(format!("📁 Indexing new posts of {}", channel.0))
        .await;

    Ok(format!(
        "{} Indexing new posts of {}.\n📁 Files in catalog: {}",
        emoji::SUCCESS,
        channel.0,
        files
    ))
}

/// Store a media post if it comes from an indexed channel.
///
/// Returns `true` when the post was upserted.
pub async fn index_post(ctx: &BotContext, record: FileRecord) -> BotResult<bool> {
    let channel = ChatId(record.source_chat_id);
    if !ctx.is_indexed_channel(channel) {
        return Ok(false);
    }

    tracing::debug!(channel = channel.0, message = record.source_message_id, name = %record.display_name, "Indexing post");
    ctx.catalog.upsert_file(record).await?;
    Ok(true)
}

/// Relay `message` to every user and report the tally to the admin log
pub async fn run_broadcast(ctx: &BotContext, from_chat: ChatId, message: MessageId) -> BotResult<BroadcastTally> {
    let users = ctx.catalog.find_users().await?;
    tracing::info!(users = users.len(), "Starting broadcast");

    let tally = broadcast(
        ctx.transport.as_ref(),
        &users,
        from_chat,
        message,
        ctx.config.broadcast_delay,
    )
    .await;

    ctx.admin_log.record(broadcast_report(&tally)).await;
    Ok(tally)
}

pub fn broadcast_report(tally: &BroadcastTally) -> String {
    format!(
        "{} Broadcast finished\n\n{} Success: {}\n{} Failed: {}",
        emoji::BROADCAST,
        emoji::SUCCESS,
        tally.success,
        emoji::ERROR,
        tally.failed
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_context, MockTransport};
    use catalog::{CatalogStore, UserRecord};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stats_text_counts() {
        let mock = Arc::new(MockTransport::new());
        let ctx = test_context(mock);
        ctx.catalog.upsert_user(UserRecord::new(5, "a")).await.unwrap();
        ctx.catalog
            .upsert_file(FileRecord::new("ref", "a.mkv", -100, 1, ""))
            .await
            .unwrap();

        let text = stats_text(&ctx).await.unwrap();
        assert!(text.contains("Users: 1"));
        assert!(text.contains("Files: 1"));
        assert!(text.contains("Live sessions: 0"));
    }

    #[tokio::test]
    async fn test_index_channel_validates_argument() {
        let ctx = test_context(Arc::new(MockTransport::new()));

        let err = index_channel(&ctx, "@movies").await.unwrap_err();
        assert!(matches!(err, BotError::InvalidArguments(_)));
        let err = index_channel(&ctx, "").await.unwrap_err();
        assert!(matches!(err, BotError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_only_indexed_channels_are_stored() {
        let ctx = test_context(Arc::new(MockTransport::new()));
        let post = FileRecord::new("ref", "Show.S01E01.mkv", -1001, 7, "");

        assert!(!index_post(&ctx, post.clone()).await.unwrap());
        assert_eq!(ctx.catalog.count_files().await.unwrap(), 0);

        let reply = index_channel(&ctx, "-1001").await.unwrap();
        assert!(reply.contains("Indexing new posts of -1001"));
        assert!(index_channel(&ctx, "-1001").await.unwrap().contains("already indexed"));

        assert!(index_post(&ctx, post).await.unwrap());
        assert_eq!(ctx.catalog.count_files().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_run_broadcast_reaches_every_user() {
        let mock = Arc::new(MockTransport::new());
        let ctx = test_context(mock.clone());
        for id in [10, 20, 30] {
            ctx.catalog.upsert_user(UserRecord::new(id, "u")).await.unwrap();
        }
        mock.fail_copies_to(ChatId(20));

        // the dispatcher runs endpoints on spawned tasks
        let task_ctx = ctx.clone();
        let tally = tokio::spawn(async move { run_broadcast(&task_ctx, ChatId(1), MessageId(9)).await })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tally, BroadcastTally { success: 2, failed: 1 });
        assert_eq!(mock.copies().last().map(|copy| copy.to), Some(ChatId(30)));
        assert!(broadcast_report(&tally).contains("Success: 2"));
    }
}
