pub mod admin;
pub mod admin_log;
pub mod broadcast;
pub mod callbacks;
pub mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod handlers;
pub mod keyboards;
pub mod membership;
pub mod navigation;
pub mod telegram;
pub mod transport;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;

pub use config::{BotConfig, ConfigError};
pub use context::BotContext;
pub use error::{BotError, BotResult};
pub use teloxide::prelude::Dispatcher;
pub use transport::Transport;
pub use types::{Command, HandlerResult};
