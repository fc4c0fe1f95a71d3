//! The command surface.
//!
//! [`Hub`] owns the repository collection, the undo/redo log, and the global
//! commit history. Every mutating command takes the acting user explicitly,
//! validates all of its preconditions before touching state, writes the
//! relevant commit-log entries, and records an [`OperationRecord`] that can
//! revert it.
//!
//! # Concurrency
//!
//! `Hub` is a plain owned value driven through `&mut self`. It is meant for
//! a single caller at a time; concurrent callers must wrap it in a `Mutex`
//! (or an actor) themselves.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{CoreError, CoreResult};
use crate::model::branch::{BranchInfo, MergeSummary};
use crate::model::commit_log::CommitLog;
use crate::model::file_store::FileStore;
use crate::model::types::{validate_name, File, NameKind};
use crate::oplog::{OpPayload, OperationLog, OperationRecord, RedoPolicy, Replay};
use crate::repository::{Repository, RepositoryCollection};
use crate::search::{search_files, SearchTarget};

/// Repositories, their undo/redo history, and the global commit log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hub {
    #[serde(default)]
    repositories: RepositoryCollection,
    #[serde(default)]
    oplog: OperationLog,
    #[serde(default)]
    history: CommitLog,
}

impl Hub {
    /// An empty hub using the given redo policy.
    #[must_use]
    pub fn new(policy: RedoPolicy) -> Self {
        Self {
            repositories: RepositoryCollection::new(),
            oplog: OperationLog::new(policy),
            history: CommitLog::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Repositories
    // -----------------------------------------------------------------------

    /// Create an empty repository with a `main` branch.
    ///
    /// # Errors
    /// [`CoreError::InvalidName`] or [`CoreError::RepositoryExists`].
    #[instrument(skip(self))]
    pub fn create_repository(&mut self, user: &str, name: &str) -> CoreResult<()> {
        let snapshot = self.repositories.create(name)?.clone();
        self.history
            .append(format!("Created Repository: {name}"), user);
        self.oplog.record(OperationRecord::now(
            name,
            user,
            OpPayload::CreateRepo {
                snapshot: Box::new(snapshot),
            },
        ));
        info!("repository created");
        Ok(())
    }

    /// Delete a repository. The whole repository is kept in the operation
    /// record, so undo restores it with all branches, files, and tasks.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`].
    #[instrument(skip(self))]
    pub fn delete_repository(&mut self, user: &str, name: &str) -> CoreResult<()> {
        let removed = self.repositories.delete(name)?;
        self.history
            .append(format!("Deleted Repository: {name}"), user);
        self.oplog.record(OperationRecord::now(
            name,
            user,
            OpPayload::DeleteRepo {
                snapshot: Box::new(removed),
            },
        ));
        info!("repository deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Files (always on the repository's active branch)
    // -----------------------------------------------------------------------

    /// Create a file on the active branch.
    ///
    /// # Errors
    /// [`CoreError::InvalidName`], [`CoreError::RepositoryNotFound`], or
    /// [`CoreError::FileExists`].
    #[instrument(skip(self, content))]
    pub fn create_file(
        &mut self,
        user: &str,
        repo: &str,
        name: &str,
        content: &str,
    ) -> CoreResult<()> {
        validate_name(NameKind::File, name)?;
        let branch = self.active_files_mut(repo, |files| files.create(name, content))?;
        self.log_file_action(user, repo, &branch, format!("Created File: {name}"));
        self.oplog.record(OperationRecord::now(
            repo,
            user,
            OpPayload::CreateFile {
                branch,
                file: name.to_owned(),
                content: content.to_owned(),
                index: None,
            },
        ));
        Ok(())
    }

    /// Replace a file's content on the active branch.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`] or [`CoreError::FileNotFound`].
    #[instrument(skip(self, content))]
    pub fn edit_file(
        &mut self,
        user: &str,
        repo: &str,
        name: &str,
        content: &str,
    ) -> CoreResult<()> {
        let mut before = String::new();
        let branch = self.active_files_mut(repo, |files| {
            before = files.edit(name, content)?;
            Ok(())
        })?;
        self.log_file_action(user, repo, &branch, format!("Edited File: {name}"));
        self.oplog.record(OperationRecord::now(
            repo,
            user,
            OpPayload::EditFile {
                branch,
                file: name.to_owned(),
                before,
                after: content.to_owned(),
            },
        ));
        Ok(())
    }

    /// Delete a file from the active branch.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`] or [`CoreError::FileNotFound`].
    #[instrument(skip(self))]
    pub fn delete_file(&mut self, user: &str, repo: &str, name: &str) -> CoreResult<()> {
        let mut removed = (0, String::new());
        let branch = self.active_files_mut(repo, |files| {
            let (index, file) = files.delete_full(name)?;
            removed = (index, file.content);
            Ok(())
        })?;
        let (index, content) = removed;
        self.log_file_action(user, repo, &branch, format!("Deleted File: {name}"));
        self.oplog.record(OperationRecord::now(
            repo,
            user,
            OpPayload::DeleteFile {
                branch,
                file: name.to_owned(),
                content,
                index: Some(index),
            },
        ));
        Ok(())
    }

    /// Run `f` against the active branch's files; on success return the
    /// active branch name.
    fn active_files_mut(
        &mut self,
        repo: &str,
        f: impl FnOnce(&mut FileStore) -> CoreResult<()>,
    ) -> CoreResult<String> {
        let tree = self.repositories.get_mut(repo)?.branches_mut();
        let branch = tree.active_name().to_owned();
        let active = tree
            .branch_mut(&branch)
            .ok_or_else(|| CoreError::branch_not_found(&branch))?;
        f(&mut active.files)?;
        Ok(branch)
    }

    fn log_file_action(&mut self, user: &str, repo: &str, branch: &str, action: String) {
        self.history
            .append(format!("{action} in branch {branch}"), user);
        if let Some(b) = self
            .repositories
            .find_mut(repo)
            .and_then(|r| r.branches_mut().branch_mut(branch))
        {
            b.log.append(action, user);
        }
    }

    // -----------------------------------------------------------------------
    // Branches
    // -----------------------------------------------------------------------

    /// Create branch `new` as a copy of `base`. Does not switch to it.
    ///
    /// Branch operations are not undoable, but under
    /// [`RedoPolicy::Clear`] they still invalidate pending redo entries.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`], [`CoreError::InvalidName`],
    /// [`CoreError::BranchExists`], or [`CoreError::BranchNotFound`].
    #[instrument(skip(self))]
    pub fn create_branch(
        &mut self,
        user: &str,
        repo: &str,
        base: &str,
        new: &str,
    ) -> CoreResult<()> {
        self.repositories
            .get_mut(repo)?
            .branches_mut()
            .create_branch(base, new)?;
        self.history
            .append(format!("Created branch: {new} from {base}"), user);
        self.oplog.invalidate_redo();
        Ok(())
    }

    /// Make `name` the active branch of `repo`.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`] or [`CoreError::BranchNotFound`].
    #[instrument(skip(self))]
    pub fn switch_branch(&mut self, user: &str, repo: &str, name: &str) -> CoreResult<()> {
        self.repositories
            .get_mut(repo)?
            .branches_mut()
            .switch_branch(name)?;
        self.history
            .append(format!("Switched to branch: {name}"), user);
        Ok(())
    }

    /// Merge `source` into `target` (last writer wins).
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`] or [`CoreError::BranchNotFound`].
    #[instrument(skip(self))]
    pub fn merge_branch(
        &mut self,
        user: &str,
        repo: &str,
        source: &str,
        target: &str,
    ) -> CoreResult<MergeSummary> {
        let summary = self
            .repositories
            .get_mut(repo)?
            .branches_mut()
            .merge_branch(source, target, user)?;
        self.history
            .append(format!("Merged branch {source} into {target}"), user);
        self.oplog.invalidate_redo();
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Append a task to the repository's queue.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`].
    #[instrument(skip(self))]
    pub fn add_task(&mut self, user: &str, repo: &str, task: &str) -> CoreResult<()> {
        self.repositories.get_mut(repo)?.push_task(task);
        self.history.append(format!("Added Task: {task}"), user);
        self.oplog.record(OperationRecord::now(
            repo,
            user,
            OpPayload::AddTask {
                task: task.to_owned(),
            },
        ));
        Ok(())
    }

    /// Remove and return the oldest task in the repository's queue.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`] or [`CoreError::NoTasks`].
    #[instrument(skip(self))]
    pub fn remove_task(&mut self, user: &str, repo: &str) -> CoreResult<String> {
        let task = self.repositories.get_mut(repo)?.pop_task()?;
        self.history.append(format!("Removed Task: {task}"), user);
        self.oplog.record(OperationRecord::now(
            repo,
            user,
            OpPayload::RemoveTask { task: task.clone() },
        ));
        Ok(task)
    }

    // -----------------------------------------------------------------------
    // Undo / redo
    // -----------------------------------------------------------------------

    /// Revert the most recent recorded mutation.
    ///
    /// A skipped step is still written to the global history, marked as
    /// skipped with its reason.
    ///
    /// # Errors
    /// [`CoreError::NothingToUndo`].
    #[instrument(skip(self))]
    pub fn undo(&mut self, user: &str) -> CoreResult<Replay> {
        let replay = self.oplog.undo(&mut self.repositories, user)?;
        self.history.append(replay.summary(), user);
        Ok(replay)
    }

    /// Re-apply the most recently undone mutation.
    ///
    /// # Errors
    /// [`CoreError::NothingToRedo`].
    #[instrument(skip(self))]
    pub fn redo(&mut self, user: &str) -> CoreResult<Replay> {
        let replay = self.oplog.redo(&mut self.repositories, user)?;
        self.history.append(replay.summary(), user);
        Ok(replay)
    }

    /// Pending undo records, oldest first.
    #[must_use]
    pub fn undo_stack(&self) -> &[OperationRecord] {
        self.oplog.undo_stack()
    }

    /// Pending redo records, oldest first.
    #[must_use]
    pub fn redo_stack(&self) -> &[OperationRecord] {
        self.oplog.redo_stack()
    }

    /// The active redo policy.
    #[must_use]
    pub const fn redo_policy(&self) -> RedoPolicy {
        self.oplog.policy()
    }

    /// Change the redo policy for subsequent mutations.
    pub fn set_redo_policy(&mut self, policy: RedoPolicy) {
        self.oplog.set_policy(policy);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Look up a repository by exact name.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`].
    pub fn repository(&self, name: &str) -> CoreResult<&Repository> {
        self.repositories.get(name)
    }

    /// All repositories.
    #[must_use]
    pub const fn repositories(&self) -> &RepositoryCollection {
        &self.repositories
    }

    /// Names of the files on the repository's active branch, in creation
    /// order.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`].
    pub fn list_files(&self, repo: &str) -> CoreResult<Vec<String>> {
        Ok(self.active_store(repo)?.list().map(str::to_owned).collect())
    }

    /// The file store of the repository's active branch.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`].
    pub fn active_store(&self, repo: &str) -> CoreResult<&FileStore> {
        Ok(&self.repository(repo)?.branches().current_branch().files)
    }

    /// A file on the repository's active branch.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`] or [`CoreError::FileNotFound`].
    pub fn read_file(&self, repo: &str, name: &str) -> CoreResult<&File> {
        self.active_store(repo)?
            .find_by_name(name)
            .ok_or_else(|| CoreError::file_not_found(name))
    }

    /// Branches of a repository, sorted by name.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`].
    pub fn list_branches(&self, repo: &str) -> CoreResult<Vec<BranchInfo>> {
        Ok(self.repository(repo)?.branches().list_branches())
    }

    /// Queued tasks, oldest first.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`].
    pub fn tasks(&self, repo: &str) -> CoreResult<Vec<String>> {
        Ok(self.repository(repo)?.tasks().map(str::to_owned).collect())
    }

    /// The global commit history.
    #[must_use]
    pub const fn history(&self) -> &CommitLog {
        &self.history
    }

    /// A branch's commit history; the active branch when `branch` is `None`.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`] or [`CoreError::BranchNotFound`].
    pub fn branch_history(&self, repo: &str, branch: Option<&str>) -> CoreResult<&CommitLog> {
        let tree = self.repository(repo)?.branches();
        let b = match branch {
            Some(name) => tree
                .branch(name)
                .ok_or_else(|| CoreError::branch_not_found(name))?,
            None => tree.current_branch(),
        };
        Ok(&b.log)
    }

    /// Repository names containing `term`, ignoring case.
    #[must_use]
    pub fn search_repositories(&self, term: &str) -> Vec<String> {
        self.repositories.index().search(term)
    }

    /// Files on the repository's active branch whose name or content
    /// contains `term`, ignoring case.
    ///
    /// # Errors
    /// [`CoreError::RepositoryNotFound`].
    pub fn search_files(
        &self,
        repo: &str,
        term: &str,
        target: SearchTarget,
    ) -> CoreResult<Vec<String>> {
        Ok(search_files(self.active_store(repo)?, term, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::oplog::OpKind;

    const U: &str = "alice";

    fn hub_with_repo() -> Hub {
        let mut hub = Hub::default();
        hub.create_repository(U, "R").unwrap();
        hub
    }

    fn content(hub: &Hub, file: &str) -> String {
        hub.read_file("R", file).unwrap().content.clone()
    }

    #[test]
    fn mutations_record_inverse_operations() {
        let mut hub = hub_with_repo();
        hub.create_file(U, "R", "a.txt", "1").unwrap();
        hub.edit_file(U, "R", "a.txt", "2").unwrap();
        hub.add_task(U, "R", "t").unwrap();
        hub.remove_task(U, "R").unwrap();
        hub.delete_file(U, "R", "a.txt").unwrap();

        let kinds: Vec<_> = hub.undo_stack().iter().map(OperationRecord::kind).collect();
        assert_eq!(
            kinds,
            vec![
                OpKind::CreateRepo,
                OpKind::CreateFile,
                OpKind::EditFile,
                OpKind::AddTask,
                OpKind::RemoveTask,
                OpKind::DeleteFile,
            ]
        );
        assert!(hub.undo_stack().iter().all(|r| r.user == U));
    }

    #[test]
    fn failed_commands_record_nothing() {
        let mut hub = hub_with_repo();
        let before = hub.clone();
        assert_eq!(
            hub.create_file(U, "nope", "a", "").unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            hub.edit_file(U, "R", "missing", "x").unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            hub.remove_task(U, "R").unwrap_err().kind(),
            ErrorKind::EmptyQueue
        );
        assert_eq!(
            hub.create_file(U, "R", "", "x").unwrap_err().kind(),
            ErrorKind::InvalidName
        );
        assert_eq!(hub, before);
    }

    #[test]
    fn edit_edit_undo_undo_redo() {
        let mut hub = hub_with_repo();
        hub.create_file(U, "R", "f", "orig").unwrap();
        hub.edit_file(U, "R", "f", "A").unwrap();
        hub.edit_file(U, "R", "f", "B").unwrap();

        hub.undo(U).unwrap();
        assert_eq!(content(&hub, "f"), "A");
        hub.undo(U).unwrap();
        assert_eq!(content(&hub, "f"), "orig");
        hub.redo(U).unwrap();
        assert_eq!(content(&hub, "f"), "A");
        hub.redo(U).unwrap();
        assert_eq!(content(&hub, "f"), "B");
        assert_eq!(hub.redo(U).unwrap_err(), CoreError::NothingToRedo);
    }

    #[test]
    fn undo_targets_the_branch_the_edit_happened_on() {
        let mut hub = hub_with_repo();
        hub.create_file(U, "R", "a.txt", "1").unwrap();
        hub.create_branch(U, "R", "main", "dev").unwrap();
        hub.switch_branch(U, "R", "dev").unwrap();
        hub.edit_file(U, "R", "a.txt", "dev-edit").unwrap();
        hub.switch_branch(U, "R", "main").unwrap();

        hub.undo(U).unwrap();
        let dev = hub.repository("R").unwrap().branches().branch("dev").unwrap();
        assert_eq!(dev.files.find_by_name("a.txt").unwrap().content, "1");
        assert_eq!(content(&hub, "a.txt"), "1");
    }

    #[test]
    fn commit_logs_are_written() {
        let mut hub = hub_with_repo();
        hub.create_file(U, "R", "a.txt", "1").unwrap();
        hub.undo(U).unwrap();

        let actions: Vec<_> = hub.history().records().iter().map(|r| r.action.as_str()).collect();
        assert_eq!(
            actions,
            vec![
                "Created Repository: R",
                "Created File: a.txt in branch main",
                "Undo: Deleted file a.txt",
            ]
        );
        let main_log = hub.branch_history("R", None).unwrap();
        assert_eq!(main_log.records()[0].action, "Created File: a.txt");
        assert_eq!(main_log.records()[1].action, "Undo: Deleted file a.txt");
    }

    #[test]
    fn branch_commands_clear_redo_under_clear_policy() {
        let mut hub = hub_with_repo();
        hub.create_file(U, "R", "a", "1").unwrap();
        hub.undo(U).unwrap();
        assert_eq!(hub.redo_stack().len(), 1);
        hub.switch_branch(U, "R", "main").unwrap();
        assert_eq!(hub.redo_stack().len(), 1, "switch is not a content mutation");
        hub.create_branch(U, "R", "main", "x").unwrap();
        assert!(hub.redo_stack().is_empty());
    }

    #[test]
    fn search_helpers() {
        let mut hub = Hub::default();
        hub.create_repository(U, "LeetCode").unwrap();
        hub.create_repository(U, "notes").unwrap();
        hub.create_file(U, "LeetCode", "README.md", "Two Sum").unwrap();

        assert_eq!(hub.search_repositories("leet"), vec!["LeetCode"]);
        assert_eq!(
            hub.search_files("LeetCode", "two", SearchTarget::Content).unwrap(),
            vec!["README.md"]
        );
        assert!(hub
            .search_files("LeetCode", "two", SearchTarget::Name)
            .unwrap()
            .is_empty());
    }
}
