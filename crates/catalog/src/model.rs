//! Records held by the catalog

use chrono::{DateTime, Utc};

/// An indexed media file.
///
/// The record points back at the channel post it was indexed from, so
/// delivery is a copy of that post rather than a re-upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Platform file handle
    pub file_ref: String,
    /// Lower-cased file name, used for search and facet extraction
    pub display_name: String,
    /// Chat the file was posted in
    pub source_chat_id: i64,
    /// Message id of the post inside `source_chat_id`
    pub source_message_id: i32,
    pub caption: String,
    pub indexed_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a record stamped with the current time
    pub fn new(
        file_ref: impl Into<String>,
        file_name: &str,
        source_chat_id: i64,
        source_message_id: i32,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            file_ref: file_ref.into(),
            display_name: file_name.to_lowercase(),
            source_chat_id,
            source_message_id,
            caption: caption.into(),
            indexed_at: Utc::now(),
        }
    }
}

/// A user who started the bot in private.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: u64,
    pub name: String,
    pub joined_at: DateTime<Utc>,
    pub banned: bool,
}

impl UserRecord {
    pub fn new(user_id: u64, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            joined_at: Utc::now(),
            banned: false,
        }
    }
}
