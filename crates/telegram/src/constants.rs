//! Constants used throughout the telegram bot

use std::time::Duration;

/// Default number of files per result page
pub const PAGE_SIZE: usize = 10;

/// Default cap on catalog hits per search
pub const SEARCH_LIMIT: usize = 50;

/// Shorter group messages are not treated as searches
pub const MIN_QUERY_LEN: usize = 2;

/// Telegram rejects callback data above this size
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

/// Quality buttons shown on a quality selection menu
pub const MAX_QUALITY_BUTTONS: usize = 4;

/// Season buttons shown on a season selection menu
pub const MAX_SEASON_BUTTONS: usize = 8;

/// File names are truncated to this many characters on buttons
pub const BUTTON_LABEL_LEN: usize = 40;

/// Lifetime of the "join channel" prompt
pub const JOIN_PROMPT_TTL: Duration = Duration::from_secs(10);

/// Delay before a result list is removed after a file was picked
pub const FILE_MESSAGE_TTL: Duration = Duration::from_secs(15);

/// Lifetime of the "no results" notice
pub const NO_RESULTS_TTL: Duration = Duration::from_secs(5);

/// Default pause between two broadcast sends
pub const BROADCAST_DELAY: Duration = Duration::from_millis(100);

/// Default port of the health endpoint
pub const HEALTH_PORT: u16 = 10000;

/// Emoji constants for consistent UI
pub mod emoji {
    pub const SUCCESS: &str = "✅";
    pub const ERROR: &str = "❌";
    pub const INFO: &str = "📊";
    pub const FOLDER: &str = "📁";
    pub const SEASON: &str = "📂";
    pub const SEARCH: &str = "🔍";
    pub const PAGE: &str = "📄";
    pub const QUALITY: &str = "🎞️";
    pub const EXPIRED: &str = "⌛";
    pub const DENIED: &str = "🚫";
    pub const BROADCAST: &str = "📢";
}

/// Usage messages for commands
pub mod usage {
    pub const INDEX: &str = "Usage: /index <channel_id>\n\nExample: /index -1001234567890\nThe bot must be an admin of the channel.";
    pub const BROADCAST: &str = "Usage: reply to the message you want to broadcast with /broadcast";
}
