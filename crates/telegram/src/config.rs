//! Bot configuration loaded from the environment

use std::time::Duration;

use teloxide::types::{ChatId, UserId};

use crate::constants::{BROADCAST_DELAY, HEALTH_PORT, PAGE_SIZE, SEARCH_LIMIT};
use crate::utils;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in the environment or .env file")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings shared by every handler
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub admin_id: UserId,
    /// Channel receiving the admin log, if any
    pub log_channel: Option<ChatId>,
    /// Channels a user must be a member of before searching
    pub fsub_channels: Vec<ChatId>,
    /// Let users through when the membership query itself fails
    pub fsub_fail_open: bool,
    /// Channels whose new media posts are indexed
    pub index_channels: Vec<ChatId>,
    pub session_ttl: Duration,
    pub session_capacity: usize,
    pub session_secret: String,
    pub page_size: usize,
    pub search_limit: usize,
    pub broadcast_delay: Duration,
    pub port: u16,
    /// Bot username, filled in at startup from `getMe`
    pub bot_username: String,
}

impl BotConfig {
    /// Defaults for everything but the administrator
    pub fn new(admin_id: UserId) -> Self {
        Self {
            admin_id,
            log_channel: None,
            fsub_channels: Vec::new(),
            fsub_fail_open: true,
            index_channels: Vec::new(),
            session_ttl: session::DEFAULT_TTL,
            session_capacity: session::DEFAULT_CAPACITY,
            session_secret: uuid::Uuid::new_v4().simple().to_string(),
            page_size: PAGE_SIZE,
            search_limit: SEARCH_LIMIT,
            broadcast_delay: BROADCAST_DELAY,
            port: HEALTH_PORT,
            bot_username: String::new(),
        }
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());

        let admin_id = get("ADMIN_ID").ok_or(ConfigError::Missing("ADMIN_ID"))?;
        let mut config = Self::new(UserId(parse_number("ADMIN_ID", &admin_id)?));

        if let Some(value) = get("LOG_CHANNEL") {
            config.log_channel = Some(ChatId(parse_number("LOG_CHANNEL", &value)?));
        }
        if let Some(value) = get("FSUB_CHANNELS") {
            config.fsub_channels = parse_channels("FSUB_CHANNELS", &value)?;
        }
        if let Some(value) = get("FSUB_FAIL_OPEN") {
            config.fsub_fail_open = parse_bool("FSUB_FAIL_OPEN", &value)?;
        }
        if let Some(value) = get("INDEX_CHANNELS") {
            config.index_channels = parse_channels("INDEX_CHANNELS", &value)?;
        }
        if let Some(value) = get("SESSION_TTL_SECS") {
            config.session_ttl = Duration::from_secs(parse_number("SESSION_TTL_SECS", &value)?);
        }
        if let Some(value) = get("SESSION_CAPACITY") {
            config.session_capacity = parse_positive("SESSION_CAPACITY", &value)?;
        }
        if let Some(value) = get("SESSION_SECRET") {
            config.session_secret = value;
        }
        if let Some(value) = get("PAGE_SIZE") {
            config.page_size = parse_positive("PAGE_SIZE", &value)?;
        }
        if let Some(value) = get("SEARCH_LIMIT") {
            config.search_limit = parse_positive("SEARCH_LIMIT", &value)?;
        }
        if let Some(value) = get("BROADCAST_DELAY_MS") {
            config.broadcast_delay = Duration::from_millis(parse_number("BROADCAST_DELAY_MS", &value)?);
        }
        if let Some(value) = get("PORT") {
            config.port = parse_number("PORT", &value)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_positive(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    match parse_number::<usize>(key, value)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
        n => Ok(n),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_channels(key: &'static str, value: &str) -> Result<Vec<ChatId>, ConfigError> {
    utils::parse_chat_ids(value)
        .map(|ids| ids.into_iter().map(ChatId).collect())
        .map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
}
