//! Force-subscribe gate
//!
//! Searching is reserved to members of the configured channels. Users who
//! are not members get a short-lived prompt with a join button.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use teloxide::types::{ChatId, MessageId, UserId};

use crate::constants::JOIN_PROMPT_TTL;
use crate::keyboards;
use crate::transport::{schedule_delete, MemberStatus, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    /// The user has to join this channel first
    MustJoin(ChatId),
}

#[derive(Debug, Clone)]
pub struct MembershipGate {
    channels: Vec<ChatId>,
    fail_open: bool,
    /// Join links resolved once per channel and reused by every prompt
    invite_links: Arc<RwLock<HashMap<ChatId, String>>>,
}

impl MembershipGate {
    pub fn new(channels: Vec<ChatId>, fail_open: bool) -> Self {
        Self {
            channels,
            fail_open,
            invite_links: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check `user` against every channel, stopping at the first one the
    /// user is not a member of.
    ///
    /// A failed membership query lets the user through when the gate is
    /// fail-open and blocks otherwise.
    pub async fn check(&self, transport: &dyn Transport, user: UserId) -> GateDecision {
        for &channel in &self.channels {
            match transport.member_status(channel, user).await {
                Ok(MemberStatus::Member) => {}
                Ok(status) => {
                    tracing::debug!(user = user.0, channel = channel.0, ?status, "User is not subscribed");
                    return GateDecision::MustJoin(channel);
                }
                Err(e) => {
                    tracing::warn!(
                        user = user.0,
                        channel = channel.0,
                        fail_open = self.fail_open,
                        "Membership query failed: {}",
                        e
                    );
                    if !self.fail_open {
                        return GateDecision::MustJoin(channel);
                    }
                }
            }
        }
        GateDecision::Allowed
    }

    pub async fn is_allowed(&self, transport: &dyn Transport, user: UserId) -> bool {
        self.check(transport, user).await == GateDecision::Allowed
    }

    /// Join link for `channel`, asking the transport only on first use
    pub async fn invite_link(&self, transport: &dyn Transport, channel: ChatId) -> Option<String> {
        {
            let links = self.invite_links.read().unwrap_or_else(|e| e.into_inner());
            if let Some(link) = links.get(&channel) {
                return Some(link.clone());
            }
        }

        match transport.invite_link(channel).await {
            Ok(link) => {
                let mut links = self.invite_links.write().unwrap_or_else(|e| e.into_inner());
                Some(links.entry(channel).or_insert(link).clone())
            }
            Err(e) => {
                tracing::warn!(channel = channel.0, "Could not resolve invite link: {}", e);
                None
            }
        }
    }

    /// Reply with a join prompt for `channel` and remove it after a short delay
    pub async fn prompt_join(&self, transport: Arc<dyn Transport>, chat: ChatId, reply_to: MessageId, channel: ChatId) {
        let keyboard = self
            .invite_link(transport.as_ref(), channel)
            .await
            .and_then(|link| keyboards::join_channel_keyboard(&link));

        match transport
            .reply_text(chat, reply_to, "Please join our channel first!".to_string(), keyboard)
            .await
        {
            Ok(prompt) => {
                schedule_delete(transport, chat, prompt, JOIN_PROMPT_TTL);
            }
            Err(e) => tracing::warn!(chat = chat.0, "Failed to send join prompt: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    const USER: UserId = UserId(7);

    #[tokio::test]
    async fn test_no_channels_allows_everyone() {
        let mock = MockTransport::new();
        let gate = MembershipGate::new(vec![], false);
        assert!(gate.is_allowed(&mock, USER).await);
    }

    #[tokio::test]
    async fn test_member_of_every_channel() {
        let mock = MockTransport::new();
        mock.set_status(ChatId(-1), USER, MemberStatus::Member);
        mock.set_status(ChatId(-2), USER, MemberStatus::Member);

        let gate = MembershipGate::new(vec![ChatId(-1), ChatId(-2)], false);
        assert_eq!(gate.check(&mock, USER).await, GateDecision::Allowed);
    }

    #[tokio::test]
    async fn test_first_missing_channel_fails_fast() {
        let mock = MockTransport::new();
        mock.set_status(ChatId(-1), USER, MemberStatus::Left);
        mock.set_status(ChatId(-2), USER, MemberStatus::Kicked);

        let gate = MembershipGate::new(vec![ChatId(-1), ChatId(-2)], false);
        assert_eq!(gate.check(&mock, USER).await, GateDecision::MustJoin(ChatId(-1)));
        assert_eq!(mock.status_queries(), 1);
    }

    #[tokio::test]
    async fn test_later_channel_blocks() {
        let mock = MockTransport::new();
        mock.set_status(ChatId(-1), USER, MemberStatus::Member);
        mock.set_status(ChatId(-2), USER, MemberStatus::Kicked);

        let gate = MembershipGate::new(vec![ChatId(-1), ChatId(-2)], true);
        assert_eq!(gate.check(&mock, USER).await, GateDecision::MustJoin(ChatId(-2)));
    }

    #[tokio::test]
    async fn test_query_failure_policy() {
        let mock = MockTransport::new();
        // no status registered: the query fails
        let open = MembershipGate::new(vec![ChatId(-1)], true);
        let closed = MembershipGate::new(vec![ChatId(-1)], false);

        assert!(open.is_allowed(&mock, USER).await);
        assert_eq!(closed.check(&mock, USER).await, GateDecision::MustJoin(ChatId(-1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_prompt_deletes_itself() {
        let mock = Arc::new(MockTransport::new());
        let gate = MembershipGate::new(vec![ChatId(-1)], true);
        gate.prompt_join(mock.clone(), ChatId(-500), MessageId(3), ChatId(-1)).await;

        let replies = mock.sent();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].text, "Please join our channel first!");
        assert_eq!(replies[0].reply_to, Some(MessageId(3)));
        assert!(replies[0].keyboard.is_some());
        assert!(mock.deleted().is_empty());

        tokio::time::sleep(JOIN_PROMPT_TTL + std::time::Duration::from_millis(1)).await;
        assert_eq!(mock.deleted(), vec![(ChatId(-500), replies[0].id)]);
    }

    #[tokio::test]
    async fn test_invite_link_is_resolved_once_per_channel() {
        let mock = Arc::new(MockTransport::new());
        let gate = MembershipGate::new(vec![ChatId(-1), ChatId(-2)], true);

        for message in 1..=3 {
            gate.prompt_join(mock.clone(), ChatId(-500), MessageId(message), ChatId(-1)).await;
        }
        gate.prompt_join(mock.clone(), ChatId(-500), MessageId(4), ChatId(-2)).await;

        assert_eq!(mock.invite_requests(), vec![ChatId(-1), ChatId(-2)]);
        let sent = mock.sent();
        assert_eq!(sent.len(), 4);
        assert!(sent.iter().all(|prompt| prompt.keyboard.is_some()));
    }

    #[tokio::test]
    async fn test_clones_share_resolved_links() {
        let mock = MockTransport::new();
        let gate = MembershipGate::new(vec![ChatId(-1)], true);
        let clone = gate.clone();

        assert!(gate.invite_link(&mock, ChatId(-1)).await.is_some());
        assert!(clone.invite_link(&mock, ChatId(-1)).await.is_some());
        assert_eq!(mock.invite_requests().len(), 1);
    }
}
