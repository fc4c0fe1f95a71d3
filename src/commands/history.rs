use std::fmt::Write as _;

use anyhow::Result;
use repohub_core::model::CommitLog;
use repohub_core::{OperationRecord, Replay};
use serde::Serialize;

use super::Context;

pub fn undo(ctx: &Context) -> Result<()> {
    let replay = ctx.mutate(|hub, user| hub.undo(user))?;
    ctx.emit(&replay, render_replay)
}

pub fn redo(ctx: &Context) -> Result<()> {
    let replay = ctx.mutate(|hub, user| hub.redo(user))?;
    ctx.emit(&replay, render_replay)
}

pub fn history(ctx: &Context) -> Result<()> {
    let hub = ctx.load()?;
    ctx.emit(hub.history(), render_log)
}

#[derive(Serialize)]
struct Stacks<'a> {
    undo: &'a [OperationRecord],
    redo: &'a [OperationRecord],
}

pub fn stacks(ctx: &Context) -> Result<()> {
    let hub = ctx.load()?;
    let stacks = Stacks {
        undo: hub.undo_stack(),
        redo: hub.redo_stack(),
    };
    ctx.emit(&stacks, |s| {
        let mut out = format!("Undo ({}):", s.undo.len());
        for rec in s.undo {
            let _ = write!(out, "\n  {rec}  by {}", rec.user);
        }
        let _ = write!(out, "\nRedo ({}):", s.redo.len());
        for rec in s.redo {
            let _ = write!(out, "\n  {rec}  by {}", rec.user);
        }
        out
    })
}

fn render_replay(replay: &Replay) -> String {
    replay.summary()
}

/// One line per record, oldest first.
pub fn render_log(log: &CommitLog) -> String {
    log.records()
        .iter()
        .map(|r| {
            format!(
                "{}  {:<12}  {}",
                r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                r.user,
                r.action
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
