//! Message transport used by the navigation core
//!
//! The core never talks to `Bot` directly. Everything it needs from the
//! platform goes through [`Transport`], which keeps the state machine
//! testable without network access.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId, UserId};

use crate::error::BotResult;

/// Membership of a user in a channel, as far as the gate cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Member,
    Left,
    Kicked,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(
        &self,
        chat: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> BotResult<MessageId>;

    async fn reply_text(
        &self,
        chat: ChatId,
        reply_to: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> BotResult<MessageId>;

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> BotResult<()>;

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> BotResult<()>;

    /// Copy `message` from `from` into `to` without a forward header
    async fn copy_message(&self, to: ChatId, from: ChatId, message: MessageId) -> BotResult<MessageId>;

    async fn member_status(&self, channel: ChatId, user: UserId) -> BotResult<MemberStatus>;

    async fn invite_link(&self, channel: ChatId) -> BotResult<String>;

    async fn answer_callback(&self, callback_id: &str, text: Option<String>, alert: bool) -> BotResult<()>;
}

#[async_trait]
impl Transport for Bot {
    async fn send_text(
        &self,
        chat: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> BotResult<MessageId> {
        let sent = match keyboard {
            Some(keyboard) => self.send_message(chat, text).reply_markup(keyboard).await?,
            None => self.send_message(chat, text).await?,
        };
        Ok(sent.id)
    }

    async fn reply_text(
        &self,
        chat: ChatId,
        reply_to: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> BotResult<MessageId> {
        let request = self.send_message(chat, text).reply_to_message_id(reply_to);
        let sent = match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
        Ok(sent.id)
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> BotResult<()> {
        match keyboard {
            Some(keyboard) => {
                self.edit_message_text(chat, message, text)
                    .reply_markup(keyboard)
                    .await?;
            }
            None => {
                self.edit_message_text(chat, message, text).await?;
            }
        }
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> BotResult<()> {
        Requester::delete_message(self, chat, message).await?;
        Ok(())
    }

    async fn copy_message(&self, to: ChatId, from: ChatId, message: MessageId) -> BotResult<MessageId> {
        Ok(Requester::copy_message(self, to, from, message).await?)
    }

    async fn member_status(&self, channel: ChatId, user: UserId) -> BotResult<MemberStatus> {
        let member = self.get_chat_member(channel, user).await?;
        Ok(member_status_of(member.kind.is_banned(), member.kind.is_present()))
    }

    async fn invite_link(&self, channel: ChatId) -> BotResult<String> {
        // exporting a link would revoke the current primary one
        let chat = self.get_chat(channel).await?;
        if let Some(link) = chat.invite_link() {
            return Ok(link.to_string());
        }
        if let Some(username) = chat.username() {
            return Ok(format!("https://t.me/{}", username));
        }
        Ok(self.create_chat_invite_link(channel).await?.invite_link)
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<String>, alert: bool) -> BotResult<()> {
        let request = self.answer_callback_query(callback_id.to_string());
        match text {
            Some(text) => request.text(text).show_alert(alert).await?,
            None => request.await?,
        };
        Ok(())
    }
}

/// Map a chat member lookup to the gate's view.
///
/// Restricted users only count when they are still in the chat.
pub fn member_status_of(banned: bool, present: bool) -> MemberStatus {
    if banned {
        MemberStatus::Kicked
    } else if present {
        MemberStatus::Member
    } else {
        MemberStatus::Left
    }
}

/// Delete `message` after `delay` on a separate task.
///
/// The caller does not wait for the deletion. A message that is already
/// gone counts as deleted.
pub fn schedule_delete(
    transport: Arc<dyn Transport>,
    chat: ChatId,
    message: MessageId,
    delay: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = transport.delete_message(chat, message).await {
            tracing::debug!(chat = chat.0, message = message.0, "Transient message already gone: {}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::ChatMemberKind;

    #[test]
    fn test_restricted_non_member_is_not_subscribed() {
        // restricted with is_member = false: neither banned nor present
        assert_eq!(member_status_of(false, false), MemberStatus::Left);
        // restricted but still in the chat
        assert_eq!(member_status_of(false, true), MemberStatus::Member);
        assert_eq!(member_status_of(true, false), MemberStatus::Kicked);
    }

    #[test]
    fn test_plain_member_kinds() {
        let member = ChatMemberKind::Member;
        assert_eq!(member_status_of(member.is_banned(), member.is_present()), MemberStatus::Member);

        let left = ChatMemberKind::Left;
        assert_eq!(member_status_of(left.is_banned(), left.is_present()), MemberStatus::Left);
    }
}
