//! Chat log entries.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Sender label used for messages the room itself posts.
pub const SYSTEM_SENDER: &str = "GAMEMASTER";

/// One line of room chat. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChatEntry {
    sender: String,
    text: String,
    timestamp: DateTime<Utc>,
}

impl ChatEntry {
    /// Creates an entry stamped with the current time.
    pub fn now(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Whether the room posted this entry.
    pub fn is_system(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }
}
