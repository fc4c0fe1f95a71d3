//! Repositories and the repository collection.
//!
//! A [`Repository`] owns a [`BranchTree`] and a FIFO task queue. The
//! [`RepositoryCollection`] keeps repositories in insertion order and keeps a
//! [`SearchIndex`] of their names in step with every create, delete, and
//! restore, so name uniqueness is enforced ignoring case while direct lookup
//! stays exact.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::model::branch::BranchTree;
use crate::model::types::{validate_name, NameKind};
use crate::search::SearchIndex;

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// A named repository: branches plus a task queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    name: String,
    branches: BranchTree,
    #[serde(default)]
    tasks: VecDeque<String>,
}

impl Repository {
    /// A fresh repository with an empty `main` branch and no tasks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            branches: BranchTree::new(),
            tasks: VecDeque::new(),
        }
    }

    /// Repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The branch tree.
    #[must_use]
    pub const fn branches(&self) -> &BranchTree {
        &self.branches
    }

    /// Mutable access to the branch tree.
    pub fn branches_mut(&mut self) -> &mut BranchTree {
        &mut self.branches
    }

    /// Queued tasks, front (oldest) first.
    pub fn tasks(&self) -> impl Iterator<Item = &str> + '_ {
        self.tasks.iter().map(String::as_str)
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Append a task to the back of the queue.
    pub fn push_task(&mut self, task: impl Into<String>) {
        self.tasks.push_back(task.into());
    }

    /// Remove and return the task at the front of the queue.
    ///
    /// # Errors
    /// Returns [`CoreError::NoTasks`] if the queue is empty.
    pub fn pop_task(&mut self) -> CoreResult<String> {
        self.tasks.pop_front().ok_or_else(|| CoreError::NoTasks {
            repo: self.name.clone(),
        })
    }

    /// Put a task back at the front of the queue.
    pub(crate) fn push_task_front(&mut self, task: impl Into<String>) {
        self.tasks.push_front(task.into());
    }

    /// Remove the most recently queued task equal to `task`.
    pub(crate) fn remove_last_task(&mut self, task: &str) -> bool {
        match self.tasks.iter().rposition(|t| t == task) {
            Some(i) => self.tasks.remove(i).is_some(),
            None => false,
        }
    }

    /// Remove the oldest queued task equal to `task`.
    pub(crate) fn remove_first_task(&mut self, task: &str) -> bool {
        match self.tasks.iter().position(|t| t == task) {
            Some(i) => self.tasks.remove(i).is_some(),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// RepositoryCollection
// ---------------------------------------------------------------------------

/// Insertion-ordered set of repositories keyed by unique name.
///
/// Serializes as a list of repositories; the search index is rebuilt on load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Repository>", into = "Vec<Repository>")]
pub struct RepositoryCollection {
    repos: IndexMap<String, Repository>,
    index: SearchIndex,
}

impl RepositoryCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new repository with an implicit `main` branch.
    ///
    /// # Errors
    /// - [`CoreError::InvalidName`] if `name` fails validation.
    /// - [`CoreError::RepositoryExists`] if a repository with the same name
    ///   ignoring case already exists.
    pub fn create(&mut self, name: &str) -> CoreResult<&mut Repository> {
        validate_name(NameKind::Repository, name)?;
        self.restore(Repository::new(name))
    }

    /// Remove a repository by exact name and return it whole, so the removal
    /// can be reverted with [`restore`](Self::restore).
    ///
    /// # Errors
    /// Returns [`CoreError::RepositoryNotFound`] if no repository has exactly
    /// this name.
    pub fn delete(&mut self, name: &str) -> CoreResult<Repository> {
        let repo = self
            .repos
            .shift_remove(name)
            .ok_or_else(|| CoreError::repo_not_found(name))?;
        self.index.remove(name);
        debug!(repo = name, "repository removed");
        Ok(repo)
    }

    /// Reinsert a whole repository (e.g. one returned by
    /// [`delete`](Self::delete)).
    ///
    /// # Errors
    /// Returns [`CoreError::RepositoryExists`] if the name collides, ignoring
    /// case, with a registered repository.
    pub fn restore(&mut self, repo: Repository) -> CoreResult<&mut Repository> {
        if !self.index.insert(repo.name()) {
            return Err(CoreError::RepositoryExists {
                name: repo.name().to_owned(),
            });
        }
        debug!(repo = repo.name(), "repository registered");
        let entry = self.repos.entry(repo.name().to_owned());
        Ok(entry.or_insert(repo))
    }

    /// Exact, case-sensitive lookup.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Repository> {
        self.repos.get(name)
    }

    /// Exact, case-sensitive mutable lookup.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Repository> {
        self.repos.get_mut(name)
    }

    /// Like [`find`](Self::find) but reports a missing repository as an error.
    ///
    /// # Errors
    /// Returns [`CoreError::RepositoryNotFound`].
    pub fn get(&self, name: &str) -> CoreResult<&Repository> {
        self.find(name).ok_or_else(|| CoreError::repo_not_found(name))
    }

    /// Like [`find_mut`](Self::find_mut) but reports a missing repository.
    ///
    /// # Errors
    /// Returns [`CoreError::RepositoryNotFound`].
    pub fn get_mut(&mut self, name: &str) -> CoreResult<&mut Repository> {
        self.find_mut(name)
            .ok_or_else(|| CoreError::repo_not_found(name))
    }

    /// Case-insensitive existence check through the search index.
    #[must_use]
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// The name index.
    #[must_use]
    pub const fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Repository names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.repos.keys().map(String::as_str)
    }

    /// Repositories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Repository> + '_ {
        self.repos.values()
    }

    /// Number of repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.repos.len()
    }

    /// Returns `true` if there are no repositories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

impl TryFrom<Vec<Repository>> for RepositoryCollection {
    type Error = CoreError;

    fn try_from(repos: Vec<Repository>) -> Result<Self, Self::Error> {
        let mut collection = Self::new();
        for repo in repos {
            validate_name(NameKind::Repository, repo.name())?;
            collection.restore(repo)?;
        }
        Ok(collection)
    }
}

impl From<RepositoryCollection> for Vec<Repository> {
    fn from(collection: RepositoryCollection) -> Self {
        collection.repos.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn create_then_find() {
        let mut c = RepositoryCollection::new();
        c.create("LeetCode").unwrap();
        let repo = c.find("LeetCode").unwrap();
        assert_eq!(repo.branches().active_name(), "main");
        assert!(c.find("leetcode").is_none(), "direct lookup is exact");
        assert!(c.contains_ignore_case("leetcode"));
    }

    #[test]
    fn duplicate_create_fails_ignoring_case() {
        let mut c = RepositoryCollection::new();
        c.create("Repo").unwrap();
        assert_eq!(c.create("Repo").unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert_eq!(c.create("REPO").unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn delete_returns_whole_repository_and_unindexes() {
        let mut c = RepositoryCollection::new();
        {
            let repo = c.create("R").unwrap();
            repo.push_task("write docs");
            repo.branches_mut().create_branch("main", "dev").unwrap();
        }
        let removed = c.delete("R").unwrap();
        assert_eq!(removed.task_count(), 1);
        assert!(removed.branches().branch("dev").is_some());
        assert!(c.find("R").is_none());
        assert!(c.index().search("r").is_empty());
        assert_eq!(c.delete("R").unwrap_err().kind(), ErrorKind::NotFound);

        c.restore(removed.clone()).unwrap();
        assert_eq!(c.find("R"), Some(&removed));
    }

    #[test]
    fn delete_is_case_sensitive() {
        let mut c = RepositoryCollection::new();
        c.create("Repo").unwrap();
        assert_eq!(c.delete("repo").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn names_keep_insertion_order() {
        let mut c = RepositoryCollection::new();
        for n in ["c", "a", "b"] {
            c.create(n).unwrap();
        }
        c.delete("a").unwrap();
        assert_eq!(c.names().collect::<Vec<_>>(), vec!["c", "b"]);
    }

    #[test]
    fn tasks_are_fifo() {
        let mut r = Repository::new("R");
        r.push_task("one");
        r.push_task("two");
        assert_eq!(r.pop_task().unwrap(), "one");
        assert_eq!(r.pop_task().unwrap(), "two");
        assert_eq!(r.pop_task().unwrap_err().kind(), ErrorKind::EmptyQueue);
    }

    #[test]
    fn targeted_task_removal() {
        let mut r = Repository::new("R");
        for t in ["a", "b", "a"] {
            r.push_task(t);
        }
        assert!(r.remove_last_task("a"));
        assert_eq!(r.tasks().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(r.remove_first_task("a"));
        assert_eq!(r.tasks().collect::<Vec<_>>(), vec!["b"]);
        assert!(!r.remove_first_task("zzz"));
        r.push_task_front("first");
        assert_eq!(r.tasks().next(), Some("first"));
    }

    #[test]
    fn collection_round_trips_and_rebuilds_index() {
        let mut c = RepositoryCollection::new();
        c.create("Alpha").unwrap();
        c.create("beta").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let back: RepositoryCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert!(back.contains_ignore_case("ALPHA"));
    }

    #[test]
    fn loading_rejects_case_insensitive_duplicates() {
        let repos = vec![Repository::new("Dup"), Repository::new("dup")];
        let json = serde_json::to_string(&repos).unwrap();
        assert!(serde_json::from_str::<RepositoryCollection>(&json).is_err());
    }
}
