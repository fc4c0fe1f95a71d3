//! Core domain logic for repohub.
//!
//! An in-memory model of version-controlled repositories: each repository
//! holds named branches of flat text files, a FIFO task queue, and
//! per-branch commit logs. Every content mutation is recorded as a
//! reversible [`oplog::OperationRecord`] so it can be undone and redone.
//!
//! [`Hub`] is the entry point. It is single-threaded; see [`hub`] for the
//! concurrency contract.
//!
//! # Modules
//!
//! - [`model`]: files, file stores, commit logs, branches
//! - [`repository`]: repositories, task queues, the repository collection
//! - [`search`]: case-insensitive name index and file search
//! - [`oplog`]: operation records and the undo/redo engine
//! - [`hub`]: the command surface
//! - [`error`]: [`CoreError`] and its [`ErrorKind`] taxonomy

pub mod error;
pub mod hub;
pub mod model;
pub mod oplog;
pub mod repository;
pub mod search;

pub use error::{CoreError, CoreResult, ErrorKind};
pub use hub::Hub;
pub use oplog::{OperationRecord, RedoPolicy, Replay};
pub use repository::{Repository, RepositoryCollection};
pub use search::SearchTarget;
