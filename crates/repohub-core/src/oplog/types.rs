//! Operation records: self-describing, reversible mutations.
//!
//! Every direct mutation performed through the [`Hub`](crate::Hub) produces
//! one [`OperationRecord`]. A record describes the mutation *as performed*
//! and carries everything needed to revert it (undo) or perform it again
//! (redo). Applying a record in either direction yields an updated record
//! that captures whatever the application overwrote, so the opposite
//! direction restores it exactly.
//!
//! Serialized with a `"kind"` tag:
//! `{"kind":"edit_file","branch":"main","file":"a.txt","before":"1","after":"2"}`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Repository;

// ---------------------------------------------------------------------------
// OperationRecord
// ---------------------------------------------------------------------------

/// One entry on the undo or redo stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// The repository the mutation targeted.
    pub repo: String,
    /// Who performed the original mutation.
    pub user: String,
    /// When the original mutation happened (UTC).
    pub timestamp: DateTime<Utc>,
    /// What happened, with the data needed to revert or replay it.
    #[serde(flatten)]
    pub payload: OpPayload,
}

impl OperationRecord {
    /// Build a record stamped with the current time.
    pub fn now(repo: impl Into<String>, user: impl Into<String>, payload: OpPayload) -> Self {
        Self {
            repo: repo.into(),
            user: user.into(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// The kind of mutation this record describes.
    #[must_use]
    pub const fn kind(&self) -> OpKind {
        self.payload.kind()
    }

    /// The file this record touches, if any.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match &self.payload {
            OpPayload::CreateFile { file, .. }
            | OpPayload::DeleteFile { file, .. }
            | OpPayload::EditFile { file, .. } => Some(file),
            _ => None,
        }
    }

    /// The branch this record touches, if any.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        match &self.payload {
            OpPayload::CreateFile { branch, .. }
            | OpPayload::DeleteFile { branch, .. }
            | OpPayload::EditFile { branch, .. } => Some(branch),
            _ => None,
        }
    }
}

impl fmt::Display for OperationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.kind(), self.repo)?;
        match &self.payload {
            OpPayload::CreateFile { branch, file, .. }
            | OpPayload::DeleteFile { branch, file, .. }
            | OpPayload::EditFile { branch, file, .. } => write!(f, " ({branch}:{file})"),
            OpPayload::AddTask { task } | OpPayload::RemoveTask { task } => {
                write!(f, " (task: {task})")
            }
            OpPayload::CreateRepo { .. } | OpPayload::DeleteRepo { .. } => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// OpPayload
// ---------------------------------------------------------------------------

/// The mutation recorded by an [`OperationRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OpPayload {
    /// A repository was created. `snapshot` is the repository as it stands
    /// when redo would bring it back.
    CreateRepo {
        /// Full repository state.
        snapshot: Box<Repository>,
    },

    /// A repository was deleted. `snapshot` is everything it held.
    DeleteRepo {
        /// Full repository state at deletion time.
        snapshot: Box<Repository>,
    },

    /// A file was created on `branch`.
    CreateFile {
        /// Branch the file lives on.
        branch: String,
        /// File name.
        file: String,
        /// File content.
        content: String,
        /// Position the file held when an undo removed it; redo puts it
        /// back there. `None` until the first undo.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// A file was deleted from `branch`.
    DeleteFile {
        /// Branch the file lived on.
        branch: String,
        /// File name.
        file: String,
        /// Content at deletion time.
        content: String,
        /// Position the file held in its branch; undo reinserts it there.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },

    /// A file on `branch` was edited from `before` to `after`.
    EditFile {
        /// Branch the file lives on.
        branch: String,
        /// File name.
        file: String,
        /// Content to restore on undo.
        before: String,
        /// Content to restore on redo.
        after: String,
    },

    /// A task was appended to the queue.
    AddTask {
        /// Task text.
        task: String,
    },

    /// The front task was removed from the queue.
    RemoveTask {
        /// Task text.
        task: String,
    },
}

impl OpPayload {
    /// The kind of this payload.
    #[must_use]
    pub const fn kind(&self) -> OpKind {
        match self {
            Self::CreateRepo { .. } => OpKind::CreateRepo,
            Self::DeleteRepo { .. } => OpKind::DeleteRepo,
            Self::CreateFile { .. } => OpKind::CreateFile,
            Self::DeleteFile { .. } => OpKind::DeleteFile,
            Self::EditFile { .. } => OpKind::EditFile,
            Self::AddTask { .. } => OpKind::AddTask,
            Self::RemoveTask { .. } => OpKind::RemoveTask,
        }
    }
}

/// Payload-free discriminant of [`OpPayload`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// See [`OpPayload::CreateRepo`].
    CreateRepo,
    /// See [`OpPayload::DeleteRepo`].
    DeleteRepo,
    /// See [`OpPayload::CreateFile`].
    CreateFile,
    /// See [`OpPayload::DeleteFile`].
    DeleteFile,
    /// See [`OpPayload::EditFile`].
    EditFile,
    /// See [`OpPayload::AddTask`].
    AddTask,
    /// See [`OpPayload::RemoveTask`].
    RemoveTask,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateRepo => "create_repo",
            Self::DeleteRepo => "delete_repo",
            Self::CreateFile => "create_file",
            Self::DeleteFile => "delete_file",
            Self::EditFile => "edit_file",
            Self::AddTask => "add_task",
            Self::RemoveTask => "remove_task",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// RedoPolicy
// ---------------------------------------------------------------------------

/// Whether a new direct mutation invalidates pending redo entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedoPolicy {
    /// Any new mutation clears the redo stack.
    #[default]
    Clear,
    /// Redo entries survive new mutations; replaying a stale entry may be
    /// skipped if its target changed underneath it.
    Retain,
}

impl fmt::Display for RedoPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => write!(f, "clear"),
            Self::Retain => write!(f, "retain"),
        }
    }
}
