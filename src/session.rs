//! Session file persistence.
//!
//! The CLI runs one command per process. Before each command it reads the
//! session file (a JSON snapshot of the whole [`Hub`]: repositories, undo
//! and redo stacks, global history, redo policy); after a successful
//! mutating command it writes the snapshot back atomically.
//!
//! ```json
//! {
//!   "version": 1,
//!   "hub": { "repositories": [...], "oplog": {...}, "history": [...] }
//! }
//! ```

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use repohub_core::{CoreResult, Hub, RedoPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Format version written by this build.
pub const SESSION_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// SessionFile
// ---------------------------------------------------------------------------

/// On-disk session: a versioned hub snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    /// Format version; see [`SESSION_VERSION`].
    pub version: u32,
    /// The full hub state.
    pub hub: Hub,
}

impl SessionFile {
    /// Wrap a hub at the current format version.
    #[must_use]
    pub const fn new(hub: Hub) -> Self {
        Self {
            version: SESSION_VERSION,
            hub,
        }
    }

    /// Serialize to a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns [`SessionError::Serialize`] on failure.
    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string_pretty(self).map_err(|e| SessionError::Serialize(e.to_string()))
    }

    /// Deserialize from a JSON string and check the format version.
    ///
    /// # Errors
    /// Returns [`SessionError::Deserialize`] on parse failure (including a
    /// snapshot that violates model invariants) and
    /// [`SessionError::UnsupportedVersion`] for other format versions.
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let file: Self =
            serde_json::from_str(json).map_err(|e| SessionError::Deserialize(e.to_string()))?;
        if file.version != SESSION_VERSION {
            return Err(SessionError::UnsupportedVersion {
                found: file.version,
                expected: SESSION_VERSION,
            });
        }
        Ok(file)
    }

    /// Read a session file from disk.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the file does not exist, or any
    /// error from [`from_json`](Self::from_json).
    pub fn read(path: &Path) -> Result<Self, SessionError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SessionError::NotFound(path.to_owned())
            } else {
                SessionError::Io(format!("read {}: {e}", path.display()))
            }
        })?;
        let file = Self::from_json(&contents)?;
        debug!(path = %path.display(), repos = file.hub.repositories().len(), "session loaded");
        Ok(file)
    }

    /// Write the session file atomically with fsync.
    ///
    /// 1. Create the parent directory if needed.
    /// 2. Write pretty JSON to a temporary file next to the target.
    /// 3. fsync the temporary file.
    /// 4. Rename it over the target path.
    ///
    /// # Errors
    /// Returns [`SessionError`] on I/O or serialization failure.
    pub fn write_atomic(&self, path: &Path) -> Result<(), SessionError> {
        let json = self.to_json()?;

        let dir = match path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d.to_owned(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|e| SessionError::Io(format!("create {}: {e}", dir.display())))?;

        let file_name = path
            .file_name()
            .ok_or_else(|| SessionError::Io(format!("no file name in {}", path.display())))?;
        let mut tmp_name = std::ffi::OsString::from(".");
        tmp_name.push(file_name);
        tmp_name.push(".tmp");
        let tmp_path = dir.join(tmp_name);

        let mut file = fs::File::create(&tmp_path)
            .map_err(|e| SessionError::Io(format!("create {}: {e}", tmp_path.display())))?;
        file.write_all(json.as_bytes())
            .map_err(|e| SessionError::Io(format!("write {}: {e}", tmp_path.display())))?;
        file.sync_all()
            .map_err(|e| SessionError::Io(format!("fsync {}: {e}", tmp_path.display())))?;
        drop(file);

        fs::rename(&tmp_path, path).map_err(|e| {
            SessionError::Io(format!(
                "rename {} -> {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })?;

        debug!(path = %path.display(), bytes = json.len(), "session saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entry points used by the CLI
// ---------------------------------------------------------------------------

/// Load the hub stored at `path`, or start an empty one with `policy` if
/// no session file exists yet.
///
/// # Errors
/// Any [`SessionError`] other than [`SessionError::NotFound`].
pub fn load_or_new(path: &Path, policy: RedoPolicy) -> Result<Hub, SessionError> {
    match SessionFile::read(path) {
        Ok(file) => Ok(file.hub),
        Err(SessionError::NotFound(_)) => {
            debug!(path = %path.display(), "no session file, starting empty");
            Ok(Hub::new(policy))
        }
        Err(e) => Err(e),
    }
}

/// Persist `hub` to `path`.
///
/// # Errors
/// See [`SessionFile::write_atomic`].
pub fn save(path: &Path, hub: &Hub) -> Result<(), SessionError> {
    SessionFile::new(hub.clone()).write_atomic(path)
}

/// Name of the repository created by [`sample_hub`].
pub const SAMPLE_REPO: &str = "LeetCode";

const SAMPLE_FILES: [(&str, &str); 2] = [
    (
        "LeetCodeSolutions.js",
        concat!(
            "// JavaScript solutions for LeetCode problems\n",
            "\n",
            "// Two Sum Problem\n",
            "function twoSum(nums, target) {\n",
            "    const map = new Map();\n",
            "    for (let i = 0; i < nums.length; i++) {\n",
            "        const complement = target - nums[i];\n",
            "        if (map.has(complement)) {\n",
            "            return [map.get(complement), i];\n",
            "        }\n",
            "        map.set(nums[i], i);\n",
            "    }\n",
            "    return [];\n",
            "}",
        ),
    ),
    (
        "README.md",
        concat!(
            "# LeetCode Solutions\n",
            "\n",
            "This repository contains my solutions to various LeetCode problems.\n",
            "\n",
            "## Structure\n",
            "- Each solution includes time and space complexity analysis\n",
            "- Solutions are organized by difficulty level\n",
            "- Test cases are provided for each problem",
        ),
    ),
];

/// A hub seeded with the [`SAMPLE_REPO`] repository and two files on its
/// `main` branch, created by `user` through the regular commands.
///
/// # Errors
/// Only if the sample data fails name validation.
pub fn sample_hub(policy: RedoPolicy, user: &str) -> CoreResult<Hub> {
    let mut hub = Hub::new(policy);
    hub.create_repository(user, SAMPLE_REPO)?;
    for (name, content) in SAMPLE_FILES {
        hub.create_file(user, SAMPLE_REPO, name, content)?;
    }
    Ok(hub)
}

/// Write `hub` as a new session file. Refuses to replace an existing one
/// unless `force` is set.
///
/// # Errors
/// [`SessionError::AlreadyExists`] if `path` exists and `force` is false,
/// or any write error.
pub fn init(path: &Path, hub: &Hub, force: bool) -> Result<(), SessionError> {
    if path.exists() && !force {
        return Err(SessionError::AlreadyExists(path.to_owned()));
    }
    save(path, hub)?;
    info!(
        path = %path.display(),
        policy = %hub.redo_policy(),
        repos = hub.repositories().len(),
        "session initialized"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors reading or writing a session file.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session file was not found.
    #[error("session file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// `init` would overwrite an existing session.
    #[error("session file already exists: {} (use --force to replace it)", .0.display())]
    AlreadyExists(PathBuf),
    /// The file was written by an incompatible version.
    #[error("unsupported session format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build writes.
        expected: u32,
    },
    /// Serialization error.
    #[error("session serialize error: {0}")]
    Serialize(String),
    /// Deserialization error.
    #[error("session deserialize error: {0}")]
    Deserialize(String),
    /// I/O error (not "not found").
    #[error("session I/O error: {0}")]
    Io(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
