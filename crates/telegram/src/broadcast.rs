//! Sequential broadcast of one message to every known user

use std::time::Duration;

use catalog::UserRecord;
use teloxide::types::{ChatId, MessageId};

use crate::transport::Transport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastTally {
    pub success: usize,
    pub failed: usize,
}

/// Copy `message` from `from_chat` to each user in turn, pausing `delay`
/// between sends.
///
/// A user that cannot be reached is counted and skipped. Banned users are
/// not contacted at all.
pub async fn broadcast(
    transport: &dyn Transport,
    users: &[UserRecord],
    from_chat: ChatId,
    message: MessageId,
    delay: Duration,
) -> BroadcastTally {
    let mut tally = BroadcastTally::default();
    let recipients: Vec<&UserRecord> = users.iter().filter(|user| !user.banned).collect();

    for (position, user) in recipients.iter().enumerate() {
        if position > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let Ok(chat) = i64::try_from(user.user_id).map(ChatId) else {
            tally.failed += 1;
            continue;
        };

        match transport.copy_message(chat, from_chat, message).await {
            Ok(_) => tally.success += 1,
            Err(e) => {
                tracing::debug!(user = user.user_id, "Broadcast delivery failed: {}", e);
                tally.failed += 1;
            }
        }
    }

    tracing::info!(success = tally.success, failed = tally.failed, "Broadcast finished");
    tally
}
