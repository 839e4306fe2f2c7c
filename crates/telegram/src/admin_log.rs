//! Best-effort log channel for the administrator

use std::sync::Arc;

use teloxide::types::ChatId;

use crate::transport::Transport;

/// Sends short event notes to the configured log channel.
///
/// Logging never fails from the caller's point of view.
#[derive(Clone)]
pub struct AdminLog {
    transport: Arc<dyn Transport>,
    channel: Option<ChatId>,
}

impl AdminLog {
    pub fn new(transport: Arc<dyn Transport>, channel: Option<ChatId>) -> Self {
        Self { transport, channel }
    }

    pub async fn record(&self, text: impl Into<String>) {
        let text = text.into();
        let Some(channel) = self.channel else {
            tracing::debug!("Admin log disabled, dropping: {}", text);
            return;
        };

        if let Err(e) = self.transport.send_text(channel, text, None).await {
            tracing::warn!(channel = channel.0, "Failed to write admin log: {}", e);
        }
    }
}
