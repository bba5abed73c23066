use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Id = u64;

pub const MAX_HANDLE_LENGTH: usize = 30;
pub const MAX_MESSAGE_LENGTH: usize = 100;

/// Placeholder text carried by every tombstoned post.
pub const TOMBSTONE_MESSAGE: &str =
    "The original content was removed from the system and is no longer available.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Id,
    pub handle: String,
    pub description: String,
    pub posts: Vec<Id>, // authored nodes, creation order (live only)
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) tally: Option<Tally>, // None == stale
}

/// Cached per-account counters, recomputed whenever invalidated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub post_count: usize,
    pub endorsement_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostKind {
    Original,
    Comment { reference: Id },
    Endorsement { reference: Id },
}

impl PostKind {
    pub fn reference(&self) -> Option<Id> {
        match *self {
            PostKind::Original => None,
            PostKind::Comment { reference } | PostKind::Endorsement { reference } => Some(reference),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Id,
    pub kind: PostKind,
    pub author: Option<Id>, // cleared on tombstoning
    pub message: String,
    pub deleted: bool,
    pub comments: Vec<Id>,
    pub endorsements: Vec<Id>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_original(&self) -> bool { matches!(self.kind, PostKind::Original) }
    pub fn is_comment(&self) -> bool { matches!(self.kind, PostKind::Comment { .. }) }
    pub fn is_endorsement(&self) -> bool { matches!(self.kind, PostKind::Endorsement { .. }) }

    /// Endorsements cannot be commented on or endorsed.
    pub fn is_actionable(&self) -> bool { !self.is_endorsement() }

    pub(crate) fn tombstone(&mut self) {
        self.author = None;
        self.message = TOMBSTONE_MESSAGE.to_string();
        self.deleted = true;
        self.endorsements.clear();
    }
}

/// Read-side view of an account, as surfaced by the command layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: Id,
    pub handle: String,
    pub description: String,
    pub post_count: usize,
    pub endorsement_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub id: Id,
    pub kind: PostKind,
    pub handle: Option<String>,
    pub message: String,
    pub deleted: bool,
    pub endorsement_count: usize,
    pub comment_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub accounts: usize,
    pub original_posts: usize,
    pub comment_posts: usize,
    pub endorsement_posts: usize,
}

pub fn is_valid_handle(handle: &str) -> bool {
    let len = handle.chars().count();
    (1..=MAX_HANDLE_LENGTH).contains(&len) && !handle.chars().any(char::is_whitespace)
}

pub fn is_valid_message(message: &str) -> bool {
    let len = message.chars().count();
    (1..=MAX_MESSAGE_LENGTH).contains(&len)
}

pub fn endorsement_message(handle: &str, message: &str) -> String {
    format!("EP@{handle}: {message}")
}
