//! Error types for repohub operations.
//!
//! [`CoreError`] is the single error type returned by every fallible
//! operation in this crate. Variants are specific enough that callers can
//! match on the failed precondition; [`CoreError::kind`] collapses them onto
//! the coarse taxonomy ([`ErrorKind`]) used by the command surface.

use thiserror::Error;

/// Errors returned by file store, branch, repository, and oplog operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No repository with this exact name exists.
    #[error("repository '{name}' not found")]
    RepositoryNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// A repository with this name (compared case-insensitively) exists.
    #[error("repository '{name}' already exists")]
    RepositoryExists {
        /// The name that collided.
        name: String,
    },

    /// No branch with this name exists in the repository.
    #[error("branch '{name}' not found")]
    BranchNotFound {
        /// The branch name that was looked up.
        name: String,
    },

    /// A branch with this name already exists in the repository.
    #[error("branch '{name}' already exists")]
    BranchExists {
        /// The branch name that collided.
        name: String,
    },

    /// No file with this name exists in the branch.
    #[error("file '{name}' not found")]
    FileNotFound {
        /// The file name that was looked up.
        name: String,
    },

    /// A file with this name already exists in the branch.
    #[error("file '{name}' already exists")]
    FileExists {
        /// The file name that collided.
        name: String,
    },

    /// `undo` was called with an empty undo stack.
    #[error("nothing to undo")]
    NothingToUndo,

    /// `redo` was called with an empty redo stack.
    #[error("nothing to redo")]
    NothingToRedo,

    /// A task was removed from an empty queue.
    #[error("repository '{repo}' has no tasks")]
    NoTasks {
        /// The repository whose queue was empty.
        repo: String,
    },

    /// A repository, branch, or file name failed validation.
    #[error("invalid {what} name '{value}': {reason}")]
    InvalidName {
        /// What kind of name was rejected (`"repository"`, `"branch"`, `"file"`).
        what: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Coarse classification of a [`CoreError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A repository, branch, or file lookup failed.
    NotFound,
    /// A create collided with an existing name.
    AlreadyExists,
    /// Undo or redo was requested with nothing pending.
    EmptyStack,
    /// Task removal with no tasks queued.
    EmptyQueue,
    /// A name failed validation.
    InvalidName,
}

impl CoreError {
    /// Map this error onto the coarse [`ErrorKind`] taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RepositoryNotFound { .. }
            | Self::BranchNotFound { .. }
            | Self::FileNotFound { .. } => ErrorKind::NotFound,
            Self::RepositoryExists { .. } | Self::BranchExists { .. } | Self::FileExists { .. } => {
                ErrorKind::AlreadyExists
            }
            Self::NothingToUndo | Self::NothingToRedo => ErrorKind::EmptyStack,
            Self::NoTasks { .. } => ErrorKind::EmptyQueue,
            Self::InvalidName { .. } => ErrorKind::InvalidName,
        }
    }

    pub(crate) fn repo_not_found(name: &str) -> Self {
        Self::RepositoryNotFound {
            name: name.to_owned(),
        }
    }

    pub(crate) fn branch_not_found(name: &str) -> Self {
        Self::BranchNotFound {
            name: name.to_owned(),
        }
    }

    pub(crate) fn file_not_found(name: &str) -> Self {
        Self::FileNotFound {
            name: name.to_owned(),
        }
    }
}

/// Convenience alias for results in repohub.
pub type CoreResult<T> = Result<T, CoreError>;
