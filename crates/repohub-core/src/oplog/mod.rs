//! Reversible operation log (undo/redo).
//!
//! # Modules
//!
//! - [`types`]: [`OperationRecord`], the [`OpPayload`] variants, [`RedoPolicy`]
//! - [`engine`]: [`OperationLog`] stacks and the [`apply`] step

pub mod engine;
pub mod types;

pub use engine::{apply, describe, Direction, OperationLog, Outcome, Replay};
pub use types::{OpKind, OpPayload, OperationRecord, RedoPolicy};
