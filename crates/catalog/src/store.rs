//! Catalog storage seam and the in-memory implementation

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::model::{FileRecord, UserRecord};

/// Errors raised by a catalog backend
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The backend could not be reached or refused the operation
    #[error("catalog backend unavailable: {0}")]
    Unavailable(String),
    /// The record was rejected before being written
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Storage used by the bot for users and indexed files.
///
/// Implementations must be safe to share between concurrent update handlers.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All known users, in no particular order
    async fn find_users(&self) -> Result<Vec<UserRecord>, CatalogError>;

    async fn count_users(&self) -> Result<usize, CatalogError>;

    async fn count_files(&self) -> Result<usize, CatalogError>;

    /// Case-insensitive search over display names.
    ///
    /// Every whitespace-separated term of `query` must occur in the display
    /// name. At most `limit` records are returned, in indexing order.
    async fn search_files(&self, query: &str, limit: usize) -> Result<Vec<FileRecord>, CatalogError>;

    /// Insert a file, replacing any record indexed from the same post
    async fn upsert_file(&self, record: FileRecord) -> Result<(), CatalogError>;

    /// Insert a user. Returns `true` when the user was not known before.
    async fn upsert_user(&self, record: UserRecord) -> Result<bool, CatalogError>;
}

#[derive(Default)]
struct Tables {
    /// Ordered by id so broadcasts run in a stable order
    users: BTreeMap<u64, UserRecord>,
    files: Vec<FileRecord>,
    /// (chat, message) -> position in `files`
    file_keys: HashMap<(i64, i32), usize>,
}

/// Process-local catalog, suitable for a single bot instance
#[derive(Default)]
pub struct InMemoryCatalog {
    tables: RwLock<Tables>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Split a query into lower-cased search terms
fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|term| term.to_lowercase())
        .collect()
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn find_users(&self) -> Result<Vec<UserRecord>, CatalogError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.users.values().cloned().collect())
    }

    async fn count_users(&self) -> Result<usize, CatalogError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.users.len())
    }

    async fn count_files(&self) -> Result<usize, CatalogError> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(tables.files.len())
    }

    async fn search_files(&self, query: &str, limit: usize) -> Result<Vec<FileRecord>, CatalogError> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let results: Vec<FileRecord> = tables
            .files
            .iter()
            .filter(|file| terms.iter().all(|term| file.display_name.contains(term.as_str())))
            .take(limit)
            .cloned()
            .collect();

        tracing::debug!(query, hits = results.len(), "Catalog search");
        Ok(results)
    }

    async fn upsert_file(&self, record: FileRecord) -> Result<(), CatalogError> {
        if record.file_ref.is_empty() {
            return Err(CatalogError::InvalidRecord("empty file reference".to_string()));
        }

        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let key = (record.source_chat_id, record.source_message_id);
        match tables.file_keys.get(&key).copied() {
            Some(index) => tables.files[index] = record,
            None => {
                let index = tables.files.len();
                tables.files.push(record);
                tables.file_keys.insert(key, index);
            }
        }
        Ok(())
    }

    async fn upsert_user(&self, record: UserRecord) -> Result<bool, CatalogError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        match tables.users.get_mut(&record.user_id) {
            Some(existing) => {
                existing.name = record.name;
                Ok(false)
            }
            None => {
                tables.users.insert(record.user_id, record);
                Ok(true)
            }
        }
    }
}
