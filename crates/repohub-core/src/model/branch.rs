//! Branches and the per-repository branch tree.
//!
//! Every branch owns an independent [`FileStore`]. Creating a branch deep
//! copies the base branch's files, so later edits on either side stay
//! isolated. The parent link is a name, kept for display only.
//!
//! # Invariants
//!
//! - `main` always exists and is never removed.
//! - The active branch always names an existing branch.
//! - Branch names are compared case-sensitively.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::commit_log::CommitLog;
use super::file_store::FileStore;
use super::types::{validate_name, NameKind, MAIN_BRANCH};
use crate::error::{CoreError, CoreResult};

// ---------------------------------------------------------------------------
// Branch
// ---------------------------------------------------------------------------

/// A named, independently mutable snapshot of a repository's files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name, unique within its tree.
    pub name: String,
    /// Name of the branch this one was created from (`None` for `main`).
    pub parent: Option<String>,
    /// The branch's files.
    pub files: FileStore,
    /// Actions performed on this branch.
    pub log: CommitLog,
}

impl Branch {
    fn root() -> Self {
        Self {
            name: MAIN_BRANCH.to_owned(),
            parent: None,
            files: FileStore::new(),
            log: CommitLog::new(),
        }
    }

    fn fork(base: &Self, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            parent: Some(base.name.clone()),
            files: base.files.clone(),
            log: CommitLog::new(),
        }
    }
}

/// One row of [`BranchTree::list_branches`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BranchInfo {
    /// Branch name.
    pub name: String,
    /// Whether this is the active branch.
    pub is_active: bool,
    /// The branch it was created from, if any.
    pub parent: Option<String>,
    /// Number of files on the branch.
    pub file_count: usize,
}

/// What a merge changed in the target branch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    /// Source branch name.
    pub source: String,
    /// Target branch name.
    pub target: String,
    /// Files in the target whose content was overwritten by the source.
    pub overwritten: Vec<String>,
    /// Files that existed only in the source and were added to the target.
    pub added: Vec<String>,
}

// ---------------------------------------------------------------------------
// BranchTree
// ---------------------------------------------------------------------------

/// All branches of one repository plus the active-branch pointer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BranchTreeRepr")]
pub struct BranchTree {
    branches: BTreeMap<String, Branch>,
    active: String,
}

impl Default for BranchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchTree {
    /// A tree holding only an empty, active `main` branch.
    #[must_use]
    pub fn new() -> Self {
        let main = Branch::root();
        Self {
            branches: BTreeMap::from([(main.name.clone(), main)]),
            active: MAIN_BRANCH.to_owned(),
        }
    }

    /// Create `new` as a deep copy of `base`'s files. Does not switch.
    ///
    /// # Errors
    /// - [`CoreError::InvalidName`] if `new` is not a valid branch name.
    /// - [`CoreError::BranchExists`] if `new` already exists.
    /// - [`CoreError::BranchNotFound`] if `base` does not exist.
    pub fn create_branch(&mut self, base: &str, new: &str) -> CoreResult<()> {
        validate_name(NameKind::Branch, new)?;
        if self.branches.contains_key(new) {
            return Err(CoreError::BranchExists {
                name: new.to_owned(),
            });
        }
        let base_branch = self
            .branches
            .get(base)
            .ok_or_else(|| CoreError::branch_not_found(base))?;
        let branch = Branch::fork(base_branch, new);
        debug!(base, new, files = branch.files.len(), "branch created");
        self.branches.insert(new.to_owned(), branch);
        Ok(())
    }

    /// Make `name` the active branch.
    ///
    /// # Errors
    /// Returns [`CoreError::BranchNotFound`] and leaves the tree unchanged
    /// if `name` does not exist.
    pub fn switch_branch(&mut self, name: &str) -> CoreResult<()> {
        if !self.branches.contains_key(name) {
            return Err(CoreError::branch_not_found(name));
        }
        name.clone_into(&mut self.active);
        Ok(())
    }

    /// Copy every file of `source` into `target`, overwriting same-named
    /// files (last writer wins) and appending one entry to `target`'s log.
    /// `source` is never modified.
    ///
    /// # Errors
    /// Returns [`CoreError::BranchNotFound`] naming whichever of `source` or
    /// `target` is missing (source is checked first).
    pub fn merge_branch(
        &mut self,
        source: &str,
        target: &str,
        user: &str,
    ) -> CoreResult<MergeSummary> {
        let incoming: Vec<(String, String)> = self
            .branches
            .get(source)
            .ok_or_else(|| CoreError::branch_not_found(source))?
            .files
            .iter()
            .map(|f| (f.name.clone(), f.content.clone()))
            .collect();
        let target_branch = self
            .branches
            .get_mut(target)
            .ok_or_else(|| CoreError::branch_not_found(target))?;

        let mut summary = MergeSummary {
            source: source.to_owned(),
            target: target.to_owned(),
            ..MergeSummary::default()
        };
        for (name, content) in incoming {
            if target_branch.files.upsert(&name, &content) {
                summary.overwritten.push(name);
            } else {
                summary.added.push(name);
            }
        }
        target_branch
            .log
            .append(format!("Merged branch {source} into {target}"), user);

        debug!(
            source,
            target,
            overwritten = summary.overwritten.len(),
            added = summary.added.len(),
            "branch merged"
        );
        Ok(summary)
    }

    /// The active branch.
    #[must_use]
    pub fn current_branch(&self) -> &Branch {
        // Invariant: `active` always names an existing branch.
        &self.branches[&self.active]
    }

    /// Name of the active branch.
    #[must_use]
    pub fn active_name(&self) -> &str {
        &self.active
    }

    /// Look up a branch by exact name.
    #[must_use]
    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    pub(crate) fn branch_mut(&mut self, name: &str) -> Option<&mut Branch> {
        self.branches.get_mut(name)
    }

    /// All branches sorted by name, flagging the active one.
    #[must_use]
    pub fn list_branches(&self) -> Vec<BranchInfo> {
        self.branches
            .values()
            .map(|b| BranchInfo {
                name: b.name.clone(),
                is_active: b.name == self.active,
                parent: b.parent.clone(),
                file_count: b.files.len(),
            })
            .collect()
    }

    /// Iterate branches sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Branch> + '_ {
        self.branches.values()
    }
}

// ---------------------------------------------------------------------------
// Serde: validate invariants on load
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct BranchTreeRepr {
    branches: BTreeMap<String, Branch>,
    active: String,
}

impl TryFrom<BranchTreeRepr> for BranchTree {
    type Error = String;

    fn try_from(repr: BranchTreeRepr) -> Result<Self, Self::Error> {
        if !repr.branches.contains_key(MAIN_BRANCH) {
            return Err(format!("branch tree is missing '{MAIN_BRANCH}'"));
        }
        if !repr.branches.contains_key(&repr.active) {
            return Err(format!("active branch '{}' does not exist", repr.active));
        }
        if let Some((key, b)) = repr.branches.iter().find(|(k, b)| **k != b.name) {
            return Err(format!("branch keyed '{key}' is named '{}'", b.name));
        }
        Ok(Self {
            branches: repr.branches,
            active: repr.active,
        })
    }
}
