//! CLI command handlers.
//!
//! Each handler runs against a [`Context`]: the resolved configuration plus
//! the session file path. Mutating handlers go through
//! [`Context::mutate`], which loads the hub, runs the command, and writes
//! the session back only if the command succeeded.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use repohub::config::RepohubConfig;
use repohub::format::OutputFormat;
use repohub::session;
use repohub_core::{CoreResult, Hub, RedoPolicy};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

pub mod branch;
pub mod file;
pub mod history;
pub mod repo;
pub mod task;

/// Resolved settings for one CLI invocation.
pub struct Context {
    state: PathBuf,
    user: String,
    format: OutputFormat,
    policy: RedoPolicy,
}

impl Context {
    /// Resolve config file, flags, and env into the settings for this run.
    pub fn open(
        config: Option<&Path>,
        state: Option<PathBuf>,
        user: Option<String>,
        format: Option<OutputFormat>,
    ) -> Result<Self> {
        let cfg = RepohubConfig::resolve(config).context("failed to load configuration")?;
        let ctx = Self {
            state: state.unwrap_or(cfg.session.state_file),
            user: user.unwrap_or(cfg.session.user),
            format: OutputFormat::resolve(format, cfg.output.format),
            policy: cfg.session.redo_policy,
        };
        debug!(
            state = %ctx.state.display(),
            user = %ctx.user,
            format = %ctx.format,
            policy = %ctx.policy,
            "context resolved"
        );
        Ok(ctx)
    }

    /// `repohub init`, optionally seeded with the sample repository.
    pub fn init(&self, force: bool, sample: bool) -> Result<()> {
        let hub = if sample {
            session::sample_hub(self.policy, &self.user)?
        } else {
            Hub::new(self.policy)
        };
        session::init(&self.state, &hub, force)?;
        let what = if sample {
            format!("session with sample repository {}", session::SAMPLE_REPO)
        } else {
            "empty session".to_owned()
        };
        self.done(format!(
            "Initialized {what} at {} (redo policy: {})",
            self.state.display(),
            self.policy
        ))
    }

    /// Load the hub from the session file (empty if none exists yet).
    pub fn load(&self) -> Result<Hub> {
        session::load_or_new(&self.state, self.policy)
            .with_context(|| format!("failed to load session {}", self.state.display()))
    }

    /// Load, run a mutating command, and save the result if it succeeded.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut Hub, &str) -> CoreResult<T>) -> Result<T> {
        let mut hub = self.load()?;
        let out = f(&mut hub, &self.user)?;
        session::save(&self.state, &hub)
            .with_context(|| format!("failed to save session {}", self.state.display()))?;
        Ok(out)
    }

    /// Print `data` in the configured format, using `text` for text mode.
    pub fn emit<T: Serialize>(&self, data: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        let out = self.format.render(data, text)?;
        if !out.is_empty() {
            println!("{out}");
        }
        Ok(())
    }

    /// Report a completed mutation.
    pub fn done(&self, message: String) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!("{message}");
                Ok(())
            }
            OutputFormat::Json => self.emit(&json!({ "message": message }), |_| String::new()),
        }
    }
}
