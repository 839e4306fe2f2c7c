//! Shared dependencies handed to every handler

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use catalog::CatalogStore;
use session::SessionCache;
use teloxide::types::{ChatId, UserId};

use crate::admin_log::AdminLog;
use crate::config::BotConfig;
use crate::membership::MembershipGate;
use crate::transport::Transport;

/// Everything a handler needs besides the update itself.
///
/// Cheap to clone; registered once as a dispatcher dependency.
#[derive(Clone)]
pub struct BotContext {
    pub transport: Arc<dyn Transport>,
    pub catalog: Arc<dyn CatalogStore>,
    pub sessions: SessionCache,
    pub gate: MembershipGate,
    pub admin_log: AdminLog,
    pub config: Arc<BotConfig>,
    index_channels: Arc<RwLock<HashSet<ChatId>>>,
}

impl BotContext {
    pub fn new(transport: Arc<dyn Transport>, catalog: Arc<dyn CatalogStore>, config: BotConfig) -> Self {
        let sessions = SessionCache::new(config.session_secret.clone())
            .with_ttl(config.session_ttl)
            .with_capacity(config.session_capacity);
        let gate = MembershipGate::new(config.fsub_channels.clone(), config.fsub_fail_open);
        let admin_log = AdminLog::new(Arc::clone(&transport), config.log_channel);
        let index_channels = config.index_channels.iter().copied().collect();

        Self {
            transport,
            catalog,
            sessions,
            gate,
            admin_log,
            config: Arc::new(config),
            index_channels: Arc::new(RwLock::new(index_channels)),
        }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        user == self.config.admin_id
    }

    /// Start indexing new posts of `channel`. Returns `false` if it already was.
    pub fn watch_channel(&self, channel: ChatId) -> bool {
        let mut channels = self.index_channels.write().unwrap_or_else(|e| e.into_inner());
        channels.insert(channel)
    }

    pub fn is_indexed_channel(&self, channel: ChatId) -> bool {
        let channels = self.index_channels.read().unwrap_or_else(|e| e.into_inner());
        channels.contains(&channel)
    }
}
