//! Foundation types: files and name validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Name of the root branch every repository starts with.
pub const MAIN_BRANCH: &str = "main";

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// A named text file inside a [`FileStore`](super::file_store::FileStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// File name, unique within its store.
    pub name: String,
    /// Full text content.
    pub content: String,
}

impl File {
    /// Create a new file.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

/// What a validated name identifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// A repository name.
    Repository,
    /// A branch name.
    Branch,
    /// A file name.
    File,
}

impl NameKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Branch => "branch",
            Self::File => "file",
        }
    }
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The maximum length of any name, in characters.
pub const MAX_NAME_LEN: usize = 128;

/// Validate a repository, branch, or file name.
///
/// Names must be non-empty after trimming, at most [`MAX_NAME_LEN`]
/// characters, and free of control characters. Case is preserved.
///
/// # Errors
/// Returns [`CoreError::InvalidName`] describing the first violated rule.
pub fn validate_name(kind: NameKind, s: &str) -> CoreResult<()> {
    let reject = |reason: String| CoreError::InvalidName {
        what: kind.as_str(),
        value: s.to_owned(),
        reason,
    };

    if s.trim().is_empty() {
        return Err(reject(format!("{kind} name must not be empty")));
    }
    let len = s.chars().count();
    if len > MAX_NAME_LEN {
        return Err(reject(format!(
            "{kind} name must be at most {MAX_NAME_LEN} characters, got {len}"
        )));
    }
    if s.chars().any(char::is_control) {
        return Err(reject(format!(
            "{kind} name must not contain control characters"
        )));
    }
    Ok(())
}
