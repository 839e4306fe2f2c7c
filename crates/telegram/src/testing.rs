//! In-memory transport for handler tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use catalog::InMemoryCatalog;
use teloxide::types::{ChatId, InlineKeyboardButtonKind, InlineKeyboardMarkup, MessageId, UserId};

use crate::config::BotConfig;
use crate::context::BotContext;
use crate::error::{BotError, BotResult};
use crate::transport::{MemberStatus, Transport};

pub const ADMIN: UserId = UserId(1);

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub id: MessageId,
    pub chat: ChatId,
    pub reply_to: Option<MessageId>,
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone)]
pub struct EditedMessage {
    pub chat: ChatId,
    pub message: MessageId,
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub id: String,
    pub text: Option<String>,
    pub alert: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Copied {
    pub to: ChatId,
    pub from: ChatId,
    pub message: MessageId,
}

#[derive(Default)]
struct Recorded {
    sent: Vec<SentMessage>,
    edits: Vec<EditedMessage>,
    deleted: Vec<(ChatId, MessageId)>,
    copies: Vec<Copied>,
    answers: Vec<Answer>,
    statuses: HashMap<(ChatId, UserId), MemberStatus>,
    status_queries: usize,
    invite_requests: Vec<ChatId>,
    failing_sends: HashSet<ChatId>,
    failing_copies: HashSet<ChatId>,
}

pub struct MockTransport {
    recorded: Mutex<Recorded>,
    next_id: AtomicI32,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            recorded: Mutex::new(Recorded::default()),
            next_id: AtomicI32::new(100),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_status(&self, channel: ChatId, user: UserId, status: MemberStatus) {
        self.lock().statuses.insert((channel, user), status);
    }

    pub fn fail_sends_to(&self, chat: ChatId) {
        self.lock().failing_sends.insert(chat);
    }

    pub fn fail_copies_to(&self, chat: ChatId) {
        self.lock().failing_copies.insert(chat);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    pub fn edits(&self) -> Vec<EditedMessage> {
        self.lock().edits.clone()
    }

    pub fn last_edit(&self) -> EditedMessage {
        self.lock().edits.last().cloned().expect("no message was edited")
    }

    pub fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.lock().deleted.clone()
    }

    pub fn copies(&self) -> Vec<Copied> {
        self.lock().copies.clone()
    }

    pub fn answers(&self) -> Vec<Answer> {
        self.lock().answers.clone()
    }

    pub fn status_queries(&self) -> usize {
        self.lock().status_queries
    }

    pub fn invite_requests(&self) -> Vec<ChatId> {
        self.lock().invite_requests.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(
        &self,
        chat: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> BotResult<MessageId> {
        let mut recorded = self.lock();
        if recorded.failing_sends.contains(&chat) {
            return Err(BotError::Message("Forbidden: bot was blocked by the user".to_string()));
        }
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        recorded.sent.push(SentMessage { id, chat, reply_to: None, text, keyboard });
        Ok(id)
    }

    async fn reply_text(
        &self,
        chat: ChatId,
        reply_to: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> BotResult<MessageId> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.lock().sent.push(SentMessage {
            id,
            chat,
            reply_to: Some(reply_to),
            text,
            keyboard,
        });
        Ok(id)
    }

    async fn edit_text(
        &self,
        chat: ChatId,
        message: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> BotResult<()> {
        self.lock().edits.push(EditedMessage { chat, message, text, keyboard });
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> BotResult<()> {
        let mut recorded = self.lock();
        if recorded.deleted.contains(&(chat, message)) {
            return Err(BotError::Message("Bad Request: message to delete not found".to_string()));
        }
        recorded.deleted.push((chat, message));
        Ok(())
    }

    async fn copy_message(&self, to: ChatId, from: ChatId, message: MessageId) -> BotResult<MessageId> {
        let mut recorded = self.lock();
        if recorded.failing_copies.contains(&to) {
            return Err(BotError::Message("Forbidden: bot was blocked by the user".to_string()));
        }
        recorded.copies.push(Copied { to, from, message });
        Ok(MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn member_status(&self, channel: ChatId, user: UserId) -> BotResult<MemberStatus> {
        let mut recorded = self.lock();
        recorded.status_queries += 1;
        recorded
            .statuses
            .get(&(channel, user))
            .copied()
            .ok_or_else(|| BotError::Message("Bad Request: user not found".to_string()))
    }

    async fn invite_link(&self, channel: ChatId) -> BotResult<String> {
        self.lock().invite_requests.push(channel);
        Ok(format!("https://t.me/+invite{}", channel.0.unsigned_abs()))
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<String>, alert: bool) -> BotResult<()> {
        self.lock().answers.push(Answer {
            id: callback_id.to_string(),
            text,
            alert,
        });
        Ok(())
    }
}

/// Context over a fresh in-memory catalog, with no delays between broadcasts
pub fn test_context(mock: Arc<MockTransport>) -> BotContext {
    let mut config = BotConfig::new(ADMIN);
    config.session_secret = "test-secret".to_string();
    config.bot_username = "autofilter_bot".to_string();
    config.broadcast_delay = std::time::Duration::ZERO;
    context_with(mock, config)
}

pub fn context_with(mock: Arc<MockTransport>, config: BotConfig) -> BotContext {
    BotContext::new(mock, Arc::new(InMemoryCatalog::new()), config)
}

/// (label, callback data) of every callback button, row by row
pub fn callback_buttons(keyboard: &InlineKeyboardMarkup) -> Vec<(String, String)> {
    keyboard
        .inline_keyboard
        .iter()
        .flatten()
        .filter_map(|button| match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some((button.text.clone(), data.clone())),
            _ => None,
        })
        .collect()
}

/// Session token carried by the button whose label starts with `prefix`
pub fn token_of(keyboard: &InlineKeyboardMarkup, prefix: &str) -> String {
    callback_buttons(keyboard)
        .into_iter()
        .find(|(label, _)| label.starts_with(prefix))
        .and_then(|(_, data)| data.strip_prefix("s:").map(str::to_string))
        .unwrap_or_else(|| panic!("no session button starting with {:?}", prefix))
}
