use anyhow::Result;
use clap::Subcommand;

use super::Context;
use super::history::render_log;

#[derive(Subcommand)]
pub enum BranchCommands {
    /// Create a branch as a copy of another (does not switch to it)
    Create {
        /// Repository name
        repo: String,
        /// New branch name
        name: String,
        /// Branch to copy files from
        #[arg(long, default_value = "main")]
        from: String,
    },

    /// Make a branch the active one
    Switch {
        /// Repository name
        repo: String,
        /// Branch name
        name: String,
    },

    /// Copy every file of SOURCE into TARGET, overwriting same-named files
    Merge {
        /// Repository name
        repo: String,
        /// Branch to merge from (left unchanged)
        source: String,
        /// Branch to merge into
        target: String,
    },

    /// List branches, marking the active one
    List {
        /// Repository name
        repo: String,
    },

    /// Show a branch's commit history (default: the active branch)
    History {
        /// Repository name
        repo: String,
        /// Branch name
        branch: Option<String>,
    },
}

pub fn run(ctx: &Context, cmd: BranchCommands) -> Result<()> {
    match cmd {
        BranchCommands::Create { repo, name, from } => {
            ctx.mutate(|hub, user| hub.create_branch(user, &repo, &from, &name))?;
            ctx.done(format!("Created branch {name} from {from} in {repo}"))
        }
        BranchCommands::Switch { repo, name } => {
            ctx.mutate(|hub, user| hub.switch_branch(user, &repo, &name))?;
            ctx.done(format!("Switched {repo} to branch {name}"))
        }
        BranchCommands::Merge {
            repo,
            source,
            target,
        } => {
            let summary = ctx.mutate(|hub, user| hub.merge_branch(user, &repo, &source, &target))?;
            ctx.emit(&summary, |s| {
                format!(
                    "Merged branch {} into {}: {} added, {} overwritten",
                    s.source,
                    s.target,
                    s.added.len(),
                    s.overwritten.len()
                )
            })
        }
        BranchCommands::List { repo } => {
            let hub = ctx.load()?;
            let branches = hub.list_branches(&repo)?;
            ctx.emit(&branches, |branches| {
                branches
                    .iter()
                    .map(|b| {
                        let marker = if b.is_active { "*" } else { " " };
                        match &b.parent {
                            Some(parent) => format!(
                                "{marker} {}  ({} file(s), from {parent})",
                                b.name, b.file_count
                            ),
                            None => format!("{marker} {}  ({} file(s))", b.name, b.file_count),
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        BranchCommands::History { repo, branch } => {
            let hub = ctx.load()?;
            let log = hub.branch_history(&repo, branch.as_deref())?;
            ctx.emit(log, render_log)
        }
    }
}
