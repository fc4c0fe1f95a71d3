use std::fmt;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for read commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text for humans
    #[default]
    Text,
    /// JSON - machine-parseable
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl OutputFormat {
    /// Pick the CLI flag if given, else the configured default.
    #[must_use]
    pub fn resolve(flag: Option<Self>, configured: Self) -> Self {
        flag.unwrap_or(configured)
    }

    /// Serialize data as pretty JSON.
    ///
    /// # Errors
    /// Fails only if `data`'s `Serialize` impl fails.
    pub fn to_json<T: Serialize>(data: &T) -> Result<String> {
        serde_json::to_string_pretty(data).context("JSON serialization failed")
    }

    /// Render `data` in this format: JSON via serde, text via `text`.
    ///
    /// # Errors
    /// Fails only if JSON serialization fails.
    pub fn render<T: Serialize>(self, data: &T, text: impl FnOnce(&T) -> String) -> Result<String> {
        match self {
            Self::Json => Self::to_json(data),
            Self::Text => Ok(text(data)),
        }
    }
}
