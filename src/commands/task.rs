use anyhow::Result;
use clap::Subcommand;

use super::Context;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Append a task to the back of the queue
    Add {
        /// Repository name
        repo: String,
        /// Task description
        task: String,
    },

    /// Remove the task at the front of the queue
    Remove {
        /// Repository name
        repo: String,
    },

    /// List queued tasks, front first
    List {
        /// Repository name
        repo: String,
    },
}

pub fn run(ctx: &Context, cmd: TaskCommands) -> Result<()> {
    match cmd {
        TaskCommands::Add { repo, task } => {
            ctx.mutate(|hub, user| hub.add_task(user, &repo, &task))?;
            ctx.done(format!("Added task to {repo}: {task}"))
        }
        TaskCommands::Remove { repo } => {
            let task = ctx.mutate(|hub, user| hub.remove_task(user, &repo))?;
            ctx.done(format!("Removed task from {repo}: {task}"))
        }
        TaskCommands::List { repo } => {
            let hub = ctx.load()?;
            let tasks = hub.tasks(&repo)?;
            ctx.emit(&tasks, |tasks| {
                tasks
                    .iter()
                    .enumerate()
                    .map(|(i, t)| format!("{}. {t}", i + 1))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}
