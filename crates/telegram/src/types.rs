use teloxide::macros::BotCommands;
use teloxide::types::{ChatId, MessageId, UserId};

/// Type alias for handler result types
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Start the bot (private chat)")]
    Start,
    #[command(description = "Display help information")]
    Help,
    #[command(description = "Show bot statistics (admin)")]
    Stats,
    #[command(description = "Index new posts of a channel (admin)")]
    Index(String),
    #[command(description = "Broadcast the replied message to all users (admin)")]
    Broadcast,
}

/// Static menu entries reachable from inline buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Help,
    Clone,
    Back,
    Admin,
}

impl MenuAction {
    fn as_str(self) -> &'static str {
        match self {
            MenuAction::Help => "help",
            MenuAction::Clone => "clone",
            MenuAction::Back => "back",
            MenuAction::Admin => "admin",
        }
    }
}

/// Decoded inline button payload.
///
/// Anything stateful lives in the session cache; the callback data only
/// carries the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackData {
    /// `s:<token>`
    Session(String),
    /// `m:<action>`
    Menu(MenuAction),
    /// Buttons that only display information
    Noop,
}

impl CallbackData {
    pub fn parse(data: &str) -> Option<Self> {
        if data == "noop" {
            return Some(CallbackData::Noop);
        }

        match data.split_once(':')? {
            ("s", token) if !token.is_empty() => Some(CallbackData::Session(token.to_string())),
            ("m", "help") => Some(CallbackData::Menu(MenuAction::Help)),
            ("m", "clone") => Some(CallbackData::Menu(MenuAction::Clone)),
            ("m", "back") => Some(CallbackData::Menu(MenuAction::Back)),
            ("m", "admin") => Some(CallbackData::Menu(MenuAction::Admin)),
            _ => None,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            CallbackData::Session(token) => format!("s:{}", token),
            CallbackData::Menu(action) => format!("m:{}", action.as_str()),
            CallbackData::Noop => "noop".to_string(),
        }
    }

    pub fn session(token: impl Into<String>) -> Self {
        CallbackData::Session(token.into())
    }
}

/// Screens of the navigation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    AdminPanel,
    SeasonSelect,
    QualitySelect,
    PagedList,
    /// A page past the end of the list
    NoMoreItems,
    FileDelivery,
}

/// Outcome of handling one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    To(Screen),
    /// Token unknown, expired or owned by someone else
    Expired,
    /// Privileged action requested by a regular user
    Refused,
    /// Requester must join a channel first
    Gated,
    NoResults,
    /// Nothing to do for this event
    Ignored,
}

/// A text message in a group, treated as a search
#[derive(Debug, Clone)]
pub struct GroupQuery {
    pub chat: ChatId,
    pub message: MessageId,
    pub user: UserId,
    pub text: String,
}

/// A pressed inline button
#[derive(Debug, Clone)]
pub struct CallbackInput {
    /// Callback query id, needed for the acknowledgement
    pub id: String,
    pub user: UserId,
    pub data: Option<String>,
    /// Message carrying the keyboard, absent for inline-mode messages
    pub origin: Option<(ChatId, MessageId)>,
}
