use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use repohub::format::OutputFormat;
use repohub::telemetry::{self, LogFormat};

mod commands;

/// Manage in-memory repositories with branches, tasks, and undo/redo
///
/// repohub keeps a set of named repositories in a session file. Each
/// repository has branches of plain-text files (starting with 'main'), a
/// FIFO task queue, and a commit log per branch. Every file, task, and
/// repository change can be undone and redone.
///
/// QUICK START:
///
///   repohub init
///   repohub repo create LeetCode
///   repohub file create LeetCode README.md --content "# Solutions"
///   repohub branch create LeetCode feature
///   repohub branch switch LeetCode feature
///   repohub file edit LeetCode README.md --content "# Solutions v2"
///   repohub branch merge LeetCode feature main
///   repohub undo
///
/// The acting user comes from --user, then REPOHUB_USER, then
/// [session] user in repohub.toml.
#[derive(Parser)]
#[command(name = "repohub")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'repohub <command> --help' for more information on a specific command.")]
struct Cli {
    /// Config file (default: ./repohub.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Session file (overrides [session] state_file)
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,

    /// Acting user recorded in history (overrides [session] user)
    #[arg(long, global = true, env = "REPOHUB_USER")]
    user: Option<String>,

    /// Output format for read commands (overrides [output] format)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Log event format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new session file
    ///
    /// Refuses to replace an existing session unless --force is given.
    /// With --sample the session starts with a 'LeetCode' repository
    /// holding two files.
    Init {
        /// Replace an existing session file
        #[arg(long)]
        force: bool,

        /// Seed the session with the sample 'LeetCode' repository
        #[arg(long)]
        sample: bool,
    },

    /// Create, delete, list, and search repositories
    #[command(subcommand)]
    Repo(commands::repo::RepoCommands),

    /// Create, edit, delete, read, and search files on the active branch
    #[command(subcommand)]
    File(commands::file::FileCommands),

    /// Create, switch, merge, and inspect branches
    #[command(subcommand)]
    Branch(commands::branch::BranchCommands),

    /// Queue and dequeue repository tasks
    #[command(subcommand)]
    Task(commands::task::TaskCommands),

    /// Revert the most recent file, task, or repository change
    Undo,

    /// Re-apply the most recently undone change
    Redo,

    /// Show the global commit history
    History,

    /// Show the pending undo and redo stacks, oldest first
    Stacks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    let ctx = commands::Context::open(
        cli.config.as_deref(),
        cli.state,
        cli.user,
        cli.format,
    )?;

    match cli.command {
        Commands::Init { force, sample } => ctx.init(force, sample),
        Commands::Repo(cmd) => commands::repo::run(&ctx, cmd),
        Commands::File(cmd) => commands::file::run(&ctx, cmd),
        Commands::Branch(cmd) => commands::branch::run(&ctx, cmd),
        Commands::Task(cmd) => commands::task::run(&ctx, cmd),
        Commands::Undo => commands::history::undo(&ctx),
        Commands::Redo => commands::history::redo(&ctx),
        Commands::History => commands::history::history(&ctx),
        Commands::Stacks => commands::history::stacks(&ctx),
    }
}
