use std::fmt::Write as _;

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use super::Context;

#[derive(Subcommand)]
pub enum RepoCommands {
    /// Create an empty repository with a 'main' branch
    ///
    /// Names are unique ignoring case.
    Create {
        /// Repository name
        name: String,
    },

    /// Delete a repository with all its branches, files, and tasks
    ///
    /// Undo brings the whole repository back.
    Delete {
        /// Repository name (exact)
        name: String,
    },

    /// List repositories in creation order
    List,

    /// Show a repository's branches, files, and tasks
    Show {
        /// Repository name (exact)
        name: String,
    },

    /// Find repositories whose name contains TERM, ignoring case
    Search {
        /// Substring to look for
        term: String,
    },
}

#[derive(Serialize)]
struct RepoSummary {
    name: String,
    active_branch: String,
    branches: usize,
    files: usize,
    tasks: usize,
}

pub fn run(ctx: &Context, cmd: RepoCommands) -> Result<()> {
    match cmd {
        RepoCommands::Create { name } => {
            ctx.mutate(|hub, user| hub.create_repository(user, &name))?;
            ctx.done(format!("Created repository {name}"))
        }
        RepoCommands::Delete { name } => {
            ctx.mutate(|hub, user| hub.delete_repository(user, &name))?;
            ctx.done(format!("Deleted repository {name}"))
        }
        RepoCommands::List => {
            let hub = ctx.load()?;
            let repos: Vec<RepoSummary> = hub
                .repositories()
                .iter()
                .map(|r| RepoSummary {
                    name: r.name().to_owned(),
                    active_branch: r.branches().active_name().to_owned(),
                    branches: r.branches().iter().count(),
                    files: r.branches().current_branch().files.len(),
                    tasks: r.task_count(),
                })
                .collect();
            ctx.emit(&repos, |repos| {
                repos
                    .iter()
                    .map(|r| {
                        format!(
                            "{}  [{}]  {} branch(es), {} file(s), {} task(s)",
                            r.name, r.active_branch, r.branches, r.files, r.tasks
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        RepoCommands::Show { name } => {
            let hub = ctx.load()?;
            let repo = hub.repository(&name)?;
            ctx.emit(repo, |repo| {
                let tree = repo.branches();
                let mut out = format!("Repository: {}\nActive branch: {}\n", repo.name(), tree.active_name());
                out.push_str("Branches:\n");
                for b in tree.list_branches() {
                    let marker = if b.is_active { "*" } else { " " };
                    let _ = writeln!(out, "  {marker} {}", b.name);
                }
                out.push_str("Files:\n");
                for f in tree.current_branch().files.list() {
                    let _ = writeln!(out, "    {f}");
                }
                let _ = write!(out, "Tasks: {}", repo.task_count());
                out
            })
        }
        RepoCommands::Search { term } => {
            let hub = ctx.load()?;
            let found = hub.search_repositories(&term);
            ctx.emit(&found, |names| names.join("\n"))
        }
    }
}
