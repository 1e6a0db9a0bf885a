use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::ConversationHandle;

/// Stable identifier of a chat participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Per-user dialogue state and message counters
#[derive(Debug, Clone)]
pub struct Session {
    pub conversation: ConversationHandle,
    /// Messages the user sent to the model
    pub sent_count: u64,
    /// Replies the model sent back
    pub received_count: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            conversation: ConversationHandle::new(),
            sent_count: 0,
            received_count: 0,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry of the active-users view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveUser {
    pub display_name: String,
    pub last_seen: DateTime<Local>,
}

/// Consistent point-in-time view of the store for display
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_sent: u64,
    pub total_received: u64,
    pub active_users: BTreeMap<UserId, ActiveUser>,
    pub taken_at: DateTime<Local>,
}

impl StatsSnapshot {
    /// Snapshot of a store with no activity
    pub fn empty() -> Self {
        Self {
            total_sent: 0,
            total_received: 0,
            active_users: BTreeMap::new(),
            taken_at: Local::now(),
        }
    }

    /// One-line summary for logs and status bars
    pub fn to_status_line(&self) -> String {
        format!(
            "users: {} │ from users: {} │ from bot: {}",
            self.active_users.len(),
            self.total_sent,
            self.total_received
        )
    }
}
