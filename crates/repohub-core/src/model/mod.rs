//! Data model: files, file stores, commit logs, branches.

pub mod branch;
pub mod commit_log;
pub mod file_store;
pub mod types;

pub use branch::{Branch, BranchInfo, BranchTree, MergeSummary};
pub use commit_log::{CommitLog, CommitRecord};
pub use file_store::FileStore;
pub use types::{validate_name, File, NameKind, MAIN_BRANCH, MAX_NAME_LEN};
