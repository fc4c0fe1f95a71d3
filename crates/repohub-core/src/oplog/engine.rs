//! The undo/redo engine.
//!
//! [`OperationLog`] holds two stacks of [`OperationRecord`]s. Direct
//! mutations push onto `undo`; [`OperationLog::undo`] pops a record, applies
//! its inverse against the [`RepositoryCollection`], and pushes the updated
//! record onto `redo`. [`OperationLog::redo`] is the mirror image.
//!
//! Application is a pure step `(state, record) -> (state', record')`
//! implemented by [`apply`]. If the record's target (repository, branch,
//! file, task) is gone, or the effect would collide with existing state,
//! the step is skipped: state is left untouched, the record still moves to
//! the opposite stack, and the returned [`Replay`] says why.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::{OpPayload, OperationRecord, RedoPolicy};
use crate::error::{CoreError, CoreResult};
use crate::repository::RepositoryCollection;

// ---------------------------------------------------------------------------
// Direction / Outcome / Replay
// ---------------------------------------------------------------------------

/// Which way a record is being applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Revert the recorded mutation.
    Undo,
    /// Perform the recorded mutation again.
    Redo,
}

impl Direction {
    const fn label(self) -> &'static str {
        match self {
            Self::Undo => "Undo",
            Self::Redo => "Redo",
        }
    }
}

/// Whether applying a record changed any state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The effect was applied.
    Applied,
    /// The target no longer matched; nothing changed.
    Skipped {
        /// Why the effect could not apply.
        reason: String,
    },
}

impl Outcome {
    /// Returns `true` if the effect was applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    fn skipped(err: &CoreError) -> Self {
        Self::Skipped {
            reason: err.to_string(),
        }
    }
}

/// The result of one undo or redo step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Replay {
    /// Which direction was applied.
    pub direction: Direction,
    /// The record as pushed onto the opposite stack.
    pub record: OperationRecord,
    /// Whether the effect was applied or skipped.
    pub outcome: Outcome,
}

impl Replay {
    /// Human-readable description, e.g. `"Undo: Deleted file a.txt"`.
    #[must_use]
    pub fn describe(&self) -> String {
        describe(&self.record, self.direction)
    }

    /// [`describe`](Self::describe), with the reason appended when the step
    /// was skipped.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.outcome {
            Outcome::Applied => self.describe(),
            Outcome::Skipped { reason } => format!("{} (skipped: {reason})", self.describe()),
        }
    }
}

// ---------------------------------------------------------------------------
// OperationLog
// ---------------------------------------------------------------------------

/// Undo and redo stacks plus the policy for invalidating redo.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLog {
    /// Oldest first; the last element is the next to undo.
    #[serde(default)]
    undo: Vec<OperationRecord>,
    /// Oldest first; the last element is the next to redo.
    #[serde(default)]
    redo: Vec<OperationRecord>,
    #[serde(default)]
    policy: RedoPolicy,
}

impl OperationLog {
    /// An empty log with the given redo policy.
    #[must_use]
    pub const fn new(policy: RedoPolicy) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            policy,
        }
    }

    /// The active redo policy.
    #[must_use]
    pub const fn policy(&self) -> RedoPolicy {
        self.policy
    }

    /// Change the redo policy. Existing entries are kept.
    pub fn set_policy(&mut self, policy: RedoPolicy) {
        self.policy = policy;
    }

    /// Push the record of a direct mutation.
    pub fn record(&mut self, record: OperationRecord) {
        debug!(op = %record, "recorded");
        self.invalidate_redo();
        self.undo.push(record);
    }

    /// Note a direct mutation that has no record of its own (branch create
    /// or merge), so the redo policy still applies.
    pub fn invalidate_redo(&mut self) {
        if self.policy == RedoPolicy::Clear && !self.redo.is_empty() {
            debug!(dropped = self.redo.len(), "redo history cleared");
            self.redo.clear();
        }
    }

    /// Revert the most recent undoable mutation.
    ///
    /// # Errors
    /// Returns [`CoreError::NothingToUndo`] if the undo stack is empty.
    pub fn undo(&mut self, repos: &mut RepositoryCollection, user: &str) -> CoreResult<Replay> {
        let record = self.undo.pop().ok_or(CoreError::NothingToUndo)?;
        let replay = step(repos, record, Direction::Undo, user);
        self.redo.push(replay.record.clone());
        Ok(replay)
    }

    /// Re-apply the most recently undone mutation.
    ///
    /// # Errors
    /// Returns [`CoreError::NothingToRedo`] if the redo stack is empty.
    pub fn redo(&mut self, repos: &mut RepositoryCollection, user: &str) -> CoreResult<Replay> {
        let record = self.redo.pop().ok_or(CoreError::NothingToRedo)?;
        let replay = step(repos, record, Direction::Redo, user);
        self.undo.push(replay.record.clone());
        Ok(replay)
    }

    /// Undo stack, oldest first.
    #[must_use]
    pub fn undo_stack(&self) -> &[OperationRecord] {
        &self.undo
    }

    /// Redo stack, oldest first.
    #[must_use]
    pub fn redo_stack(&self) -> &[OperationRecord] {
        &self.redo
    }
}

fn step(
    repos: &mut RepositoryCollection,
    record: OperationRecord,
    direction: Direction,
    user: &str,
) -> Replay {
    let (record, outcome) = apply(repos, record, direction);
    match &outcome {
        Outcome::Applied => {
            if let Some(branch) = record.branch()
                && let Some(b) = repos
                    .find_mut(&record.repo)
                    .and_then(|r| r.branches_mut().branch_mut(branch))
            {
                b.log.append(describe(&record, direction), user);
            }
            debug!(op = %record, direction = direction.label(), "applied");
        }
        Outcome::Skipped { reason } => {
            warn!(op = %record, direction = direction.label(), reason, "skipped");
        }
    }
    Replay {
        direction,
        record,
        outcome,
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

/// Apply `record` in `direction` to `repos`.
///
/// Returns the record updated with whatever the application overwrote (so
/// applying it in the opposite direction restores that state) and whether
/// anything changed. A skipped application leaves `repos` and the record
/// untouched.
pub fn apply(
    repos: &mut RepositoryCollection,
    mut record: OperationRecord,
    direction: Direction,
) -> (OperationRecord, Outcome) {
    let result = apply_payload(repos, &record.repo, &mut record.payload, direction);
    let outcome = match result {
        Ok(()) => Outcome::Applied,
        Err(e) => Outcome::skipped(&e),
    };
    (record, outcome)
}

fn apply_payload(
    repos: &mut RepositoryCollection,
    repo: &str,
    payload: &mut OpPayload,
    direction: Direction,
) -> CoreResult<()> {
    use Direction::{Redo, Undo};

    match (payload, direction) {
        // Bring a repository back / take it away again.
        (OpPayload::CreateRepo { snapshot }, Redo) | (OpPayload::DeleteRepo { snapshot }, Undo) => {
            repos.restore((**snapshot).clone())?;
        }
        (OpPayload::CreateRepo { snapshot }, Undo) | (OpPayload::DeleteRepo { snapshot }, Redo) => {
            **snapshot = repos.delete(repo)?;
        }

        // Remove a file, capturing its content and position.
        (OpPayload::CreateFile { branch, file, content, index }, Undo)
        | (OpPayload::DeleteFile { branch, file, content, index }, Redo) => {
            let (at, removed) = branch_files(repos, repo, branch)?.delete_full(file)?;
            *content = removed.content;
            *index = Some(at);
        }
        // Put a file back where it was.
        (OpPayload::CreateFile { branch, file, content, index }, Redo)
        | (OpPayload::DeleteFile { branch, file, content, index }, Undo) => {
            let files = branch_files(repos, repo, branch)?;
            let at = index.unwrap_or(files.len());
            files.insert_at(at, file, content)?;
        }

        (OpPayload::EditFile { branch, file, before, after }, Undo) => {
            *after = branch_files(repos, repo, branch)?.edit(file, before)?;
        }
        (OpPayload::EditFile { branch, file, before, after }, Redo) => {
            *before = branch_files(repos, repo, branch)?.edit(file, after)?;
        }

        (OpPayload::AddTask { task }, Undo) => {
            if !repos.get_mut(repo)?.remove_last_task(task) {
                return Err(CoreError::NoTasks {
                    repo: repo.to_owned(),
                });
            }
        }
        (OpPayload::AddTask { task }, Redo) => repos.get_mut(repo)?.push_task(task.clone()),
        (OpPayload::RemoveTask { task }, Undo) => {
            repos.get_mut(repo)?.push_task_front(task.clone());
        }
        (OpPayload::RemoveTask { task }, Redo) => {
            if !repos.get_mut(repo)?.remove_first_task(task) {
                return Err(CoreError::NoTasks {
                    repo: repo.to_owned(),
                });
            }
        }
    }
    Ok(())
}

fn branch_files<'a>(
    repos: &'a mut RepositoryCollection,
    repo: &str,
    branch: &str,
) -> CoreResult<&'a mut crate::model::file_store::FileStore> {
    repos
        .get_mut(repo)?
        .branches_mut()
        .branch_mut(branch)
        .map(|b| &mut b.files)
        .ok_or_else(|| CoreError::branch_not_found(branch))
}

/// Commit-log wording for applying `record` in `direction`.
#[must_use]
pub fn describe(record: &OperationRecord, direction: Direction) -> String {
    use Direction::{Redo, Undo};

    let what = match (&record.payload, direction) {
        (OpPayload::CreateRepo { .. }, Undo) => format!("Deleted repository {}", record.repo),
        (OpPayload::CreateRepo { .. }, Redo) => format!("Created repository {}", record.repo),
        (OpPayload::DeleteRepo { .. }, Undo) => format!("Restored repository {}", record.repo),
        (OpPayload::DeleteRepo { .. }, Redo) => format!("Deleted repository {}", record.repo),
        (OpPayload::CreateFile { file, .. }, Undo) => format!("Deleted file {file}"),
        (OpPayload::CreateFile { file, .. }, Redo) => format!("Created file {file}"),
        (OpPayload::DeleteFile { file, .. }, Undo) => format!("Restored file {file}"),
        (OpPayload::DeleteFile { file, .. }, Redo) => format!("Deleted file {file}"),
        (OpPayload::EditFile { file, .. }, Undo) => format!("Reverted changes to {file}"),
        (OpPayload::EditFile { file, .. }, Redo) => format!("Edited file {file}"),
        (OpPayload::AddTask { task }, Undo) => format!("Removed task {task}"),
        (OpPayload::AddTask { task }, Redo) => format!("Added task {task}"),
        (OpPayload::RemoveTask { task }, Undo) => format!("Restored task {task}"),
        (OpPayload::RemoveTask { task }, Redo) => format!("Removed task {task}"),
    };
    format!("{}: {what}", direction.label())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any sequence of edits undone completely and redone completely
        /// ends where it started and where it finished.
        #[test]
        fn prop_undo_all_then_redo_all(contents in prop::collection::vec(".{0,8}", 1..8)) {
            let mut repos = RepositoryCollection::new();
            repos.create("R").unwrap();
            let mut log = OperationLog::default();
            let files = |repos: &mut RepositoryCollection| {
                repos.get_mut("R").unwrap().branches_mut().branch_mut("main").unwrap().files.clone()
            };

            repos.get_mut("R").unwrap().branches_mut().branch_mut("main").unwrap()
                .files.create("f", "start").unwrap();
            let start = files(&mut repos);

            for c in &contents {
                let store = &mut repos.get_mut("R").unwrap().branches_mut().branch_mut("main").unwrap().files;
                let before = store.edit("f", c).unwrap();
                log.record(OperationRecord::now("R", "u", OpPayload::EditFile {
                    branch: "main".into(),
                    file: "f".into(),
                    before,
                    after: c.clone(),
                }));
            }
            let end = files(&mut repos);

            while log.undo(&mut repos, "u").is_ok() {}
            prop_assert_eq!(files(&mut repos), start);
            while log.redo(&mut repos, "u").is_ok() {}
            prop_assert_eq!(files(&mut repos), end);
        }
    }
}
