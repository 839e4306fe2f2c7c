use crate::constants::emoji;

/// Custom error type for telegram bot operations
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Telegram API error
    #[error("Telegram error: {0}")]
    TelegramError(#[from] teloxide::RequestError),
    /// Catalog backend error
    #[error("Catalog error: {0}")]
    CatalogError(#[from] catalog::CatalogError),
    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Helper trait to convert results into user-friendly messages
pub trait UserMessage {
    fn user_message(&self) -> String;
}

impl UserMessage for BotError {
    fn user_message(&self) -> String {
        match self {
            BotError::TelegramError(e) => format!("{} Communication error: {}", emoji::ERROR, e),
            BotError::CatalogError(e) => format!("{} Catalog error: {}", emoji::ERROR, e),
            BotError::InvalidArguments(msg) => format!("{} {}", emoji::ERROR, msg),
            BotError::Message(msg) => format!("{} {}", emoji::ERROR, msg),
        }
    }
}
