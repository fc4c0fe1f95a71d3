//! Append-only audit log of actions.
//!
//! One [`CommitLog`] lives on every branch and one on the hub itself. Entries
//! are display-only history; undo/redo never reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single immutable history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Free-form description of what happened.
    pub action: String,
    /// Who performed the action.
    pub user: String,
    /// When the action was recorded (UTC).
    pub timestamp: DateTime<Utc>,
}

impl CommitRecord {
    /// Create a record stamped with the current time.
    pub fn now(action: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            user: user.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only sequence of [`CommitRecord`]s, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitLog {
    records: Vec<CommitRecord>,
}

impl CommitLog {
    /// Create an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record stamped with the current time.
    pub fn append(&mut self, action: impl Into<String>, user: impl Into<String>) {
        self.records.push(CommitRecord::now(action, user));
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    /// The most recent record, if any.
    #[must_use]
    pub fn last(&self) -> Option<&CommitRecord> {
        self.records.last()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
