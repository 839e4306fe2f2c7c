//! Session cache mapping callback tokens to navigation state

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use catalog::{FileRecord, SeasonKey};
use tokio::time::Instant;

use crate::token::generate_session_token;

/// How long a token stays usable after it was minted
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Live entries kept before the oldest are evicted
pub const DEFAULT_CAPACITY: usize = 50_000;

/// A file the user picked from a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub file_ref: String,
    pub source_chat_id: i64,
    pub source_message_id: i32,
}

impl From<&FileRecord> for FileSelection {
    fn from(record: &FileRecord) -> Self {
        Self {
            file_ref: record.file_ref.clone(),
            source_chat_id: record.source_chat_id,
            source_message_id: record.source_message_id,
        }
    }
}

/// All results belonging to one season bucket, with the query that found them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonGroup {
    pub query: String,
    pub season: SeasonKey,
    pub files: Arc<Vec<FileRecord>>,
}

/// One page of a snapshotted result list.
///
/// Neighbouring pages share the same `files` snapshot, so paging stays
/// stable while the catalog changes underneath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    /// Title shown above the list
    pub query: String,
    pub files: Arc<Vec<FileRecord>>,
    /// Zero-based page index
    pub page: usize,
}

impl PageView {
    /// First page over `files`
    pub fn first(query: impl Into<String>, files: Arc<Vec<FileRecord>>) -> Self {
        Self {
            query: query.into(),
            files,
            page: 0,
        }
    }

    /// Same snapshot, different page
    pub fn with_page(&self, page: usize) -> Self {
        Self {
            query: self.query.clone(),
            files: Arc::clone(&self.files),
            page,
        }
    }
}

/// State a token resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPayload {
    File(FileSelection),
    Season(SeasonGroup),
    Page(PageView),
}

impl SessionPayload {
    /// Short tag used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            SessionPayload::File(_) => "file",
            SessionPayload::Season(_) => "season",
            SessionPayload::Page(_) => "page",
        }
    }
}

struct SessionEntry {
    owner: u64,
    payload: SessionPayload,
    created_at: Instant,
    sequence: u64,
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, SessionEntry>,
    /// Insertion order as (token, sequence); may hold tokens already dropped
    order: VecDeque<(String, u64)>,
    next_sequence: u64,
}

impl Entries {
    fn is_current(&self, token: &str, sequence: u64) -> bool {
        self.map
            .get(token)
            .is_some_and(|entry| entry.sequence == sequence)
    }

    fn evict_oldest(&mut self, capacity: usize) {
        while self.map.len() > capacity {
            let Some((token, sequence)) = self.order.pop_front() else {
                break;
            };
            if self.is_current(&token, sequence) {
                self.map.remove(&token);
                tracing::debug!(token = %token, "Evicted session entry over capacity");
            }
        }
    }

    fn compact_order(&mut self) {
        let order = std::mem::take(&mut self.order);
        self.order = order
            .into_iter()
            .filter(|(token, sequence)| self.is_current(token, *sequence))
            .collect();
    }
}

/// Thread-safe token store shared by all update handlers.
///
/// Cloning is cheap; clones share the same entries.
#[derive(Clone)]
pub struct SessionCache {
    entries: Arc<RwLock<Entries>>,
    secret: Arc<str>,
    ttl: Duration,
    capacity: usize,
}

impl SessionCache {
    /// Create a cache with the default TTL and capacity
    ///
    /// # Arguments
    /// * `secret` - Salt mixed into every token
    pub fn new(secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            secret: Arc::from(secret),
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Store `payload` for `owner` and return a fresh token.
    ///
    /// The token is visible to `retrieve` as soon as this returns.
    pub fn store(&self, owner: u64, payload: SessionPayload) -> String {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        let (token, sequence) = loop {
            let sequence = entries.next_sequence;
            entries.next_sequence = entries.next_sequence.wrapping_add(1);
            let token = generate_session_token(owner, sequence, &self.secret);
            if !entries.map.contains_key(&token) {
                break (token, sequence);
            }
        };

        tracing::trace!(owner, kind = payload.kind(), token = %token, "Stored session entry");
        entries.map.insert(
            token.clone(),
            SessionEntry {
                owner,
                payload,
                created_at: Instant::now(),
                sequence,
            },
        );
        entries.order.push_back((token.clone(), sequence));
        entries.evict_oldest(self.capacity);

        if entries.order.len() > entries.map.len().saturating_mul(2) + 64 {
            entries.compact_order();
        }

        token
    }

    /// Resolve `token` for `requester`.
    ///
    /// # Returns
    /// * `Some(payload)` if the token exists, is younger than the TTL and
    ///   belongs to `requester`
    /// * `None` otherwise; callers must treat this as an expired session
    pub fn retrieve(&self, token: &str, requester: u64) -> Option<SessionPayload> {
        self.lookup(token, Some(requester))
    }

    /// Resolve `token` without the owner check, for internal callers
    pub fn retrieve_trusted(&self, token: &str) -> Option<SessionPayload> {
        self.lookup(token, None)
    }

    fn lookup(&self, token: &str, requester: Option<u64>) -> Option<SessionPayload> {
        let now = Instant::now();
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            let entry = entries.map.get(token)?;

            if now.duration_since(entry.created_at) < self.ttl {
                return match requester {
                    Some(user) if user != entry.owner => {
                        tracing::debug!(token, user, "Session token pressed by non-owner");
                        None
                    }
                    _ => Some(entry.payload.clone()),
                };
            }
        }

        // Expired: drop it now instead of waiting for the sweep
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let expired = entries
            .map
            .get(token)
            .is_some_and(|entry| now.duration_since(entry.created_at) >= self.ttl);
        if expired {
            entries.map.remove(token);
            tracing::debug!(token, "Session entry expired");
        }
        None
    }

    /// Drop every expired entry
    ///
    /// # Returns
    /// * Number of entries removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let initial_count = entries.map.len();

        entries
            .map
            .retain(|_, entry| now.duration_since(entry.created_at) < self.ttl);
        entries.compact_order();

        initial_count - entries.map.len()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
