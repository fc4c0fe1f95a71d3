use anyhow::Result;
use clap::Subcommand;
use repohub_core::SearchTarget;

use super::Context;

#[derive(Subcommand)]
pub enum FileCommands {
    /// Create a file on the repository's active branch
    Create {
        /// Repository name
        repo: String,
        /// File name
        name: String,
        /// Initial content
        #[arg(short, long, default_value = "")]
        content: String,
    },

    /// Replace a file's content on the active branch
    Edit {
        /// Repository name
        repo: String,
        /// File name
        name: String,
        /// New content
        #[arg(short, long)]
        content: String,
    },

    /// Delete a file from the active branch
    Delete {
        /// Repository name
        repo: String,
        /// File name
        name: String,
    },

    /// List files on the active branch in creation order
    List {
        /// Repository name
        repo: String,
    },

    /// Print a file from the active branch
    Show {
        /// Repository name
        repo: String,
        /// File name
        name: String,
    },

    /// Find files on the active branch by name (or content), ignoring case
    Search {
        /// Repository name
        repo: String,
        /// Substring to look for
        term: String,
        /// Match file content instead of file names
        #[arg(long)]
        content: bool,
    },
}

pub fn run(ctx: &Context, cmd: FileCommands) -> Result<()> {
    match cmd {
        FileCommands::Create {
            repo,
            name,
            content,
        } => {
            ctx.mutate(|hub, user| hub.create_file(user, &repo, &name, &content))?;
            ctx.done(format!("Created file {name} in {repo}"))
        }
        FileCommands::Edit {
            repo,
            name,
            content,
        } => {
            ctx.mutate(|hub, user| hub.edit_file(user, &repo, &name, &content))?;
            ctx.done(format!("Edited file {name} in {repo}"))
        }
        FileCommands::Delete { repo, name } => {
            ctx.mutate(|hub, user| hub.delete_file(user, &repo, &name))?;
            ctx.done(format!("Deleted file {name} from {repo}"))
        }
        FileCommands::List { repo } => {
            let hub = ctx.load()?;
            let files = hub.list_files(&repo)?;
            ctx.emit(&files, |files| files.join("\n"))
        }
        FileCommands::Show { repo, name } => {
            let hub = ctx.load()?;
            let file = hub.read_file(&repo, &name)?;
            ctx.emit(file, |f| f.content.clone())
        }
        FileCommands::Search {
            repo,
            term,
            content,
        } => {
            let target = if content {
                SearchTarget::Content
            } else {
                SearchTarget::Name
            };
            let hub = ctx.load()?;
            let found = hub.search_files(&repo, &term, target)?;
            ctx.emit(&found, |names| names.join("\n"))
        }
    }
}
