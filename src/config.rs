//! repohub configuration (`repohub.toml`).
//!
//! Defines the typed configuration for the CLI: the default acting user,
//! where the session file lives, the redo policy applied to new sessions,
//! and the default output format.

use std::fmt;
use std::path::{Path, PathBuf};

use repohub_core::RedoPolicy;
use serde::Deserialize;

use crate::format::OutputFormat;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "repohub.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level repohub configuration.
///
/// Missing fields use defaults. A missing `./repohub.toml` means all
/// defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepohubConfig {
    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Who acts, where state is kept, and how redo behaves.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Acting user recorded on every commit and operation record.
    #[serde(default = "default_user")]
    pub user: String,

    /// Session file path, relative to the working directory.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Redo policy used when a new session file is created.
    #[serde(default)]
    pub redo_policy: RedoPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            state_file: default_state_file(),
            redo_policy: RedoPolicy::default(),
        }
    }
}

fn default_user() -> String {
    "anonymous".to_owned()
}

fn default_state_file() -> PathBuf {
    PathBuf::from(".repohub/state.json")
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Output settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Default format for read commands.
    #[serde(default)]
    pub format: OutputFormat,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a repohub configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl RepohubConfig {
    /// Load the effective configuration: `explicit` if given (it must
    /// exist), otherwise `./repohub.toml` if present, otherwise defaults.
    ///
    /// # Errors
    /// Returns `ConfigError` if an explicit file is missing, or if any file
    /// that is read cannot be parsed.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError {
                        path: Some(path.to_owned()),
                        message: "file not found".to_owned(),
                    });
                }
                Self::load(path)
            }
            None => Self::load(Path::new(DEFAULT_CONFIG_FILE)),
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   returns a [`ConfigError`] with line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_all_fields() {
        let cfg = RepohubConfig::default();
        assert_eq!(cfg.session.user, "anonymous");
        assert_eq!(cfg.session.state_file, PathBuf::from(".repohub/state.json"));
        assert_eq!(cfg.session.redo_policy, RedoPolicy::Clear);
        assert_eq!(cfg.output.format, OutputFormat::Text);
    }

    #[test]
    fn parse_empty_string() {
        assert_eq!(RepohubConfig::parse("").unwrap(), RepohubConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let cfg = RepohubConfig::parse(
            r#"
[session]
user = "alice"
state_file = "hub.json"
redo_policy = "retain"

[output]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(cfg.session.user, "alice");
        assert_eq!(cfg.session.state_file, PathBuf::from("hub.json"));
        assert_eq!(cfg.session.redo_policy, RedoPolicy::Retain);
        assert_eq!(cfg.output.format, OutputFormat::Json);
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let cfg = RepohubConfig::parse("[session]\nuser = \"bob\"\n").unwrap();
        assert_eq!(cfg.session.user, "bob");
        assert_eq!(cfg.session.redo_policy, RedoPolicy::Clear);
        assert_eq!(cfg.output, OutputConfig::default());
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        assert!(RepohubConfig::parse("[server]\nport = 1\n").is_err());
        assert!(RepohubConfig::parse("[session]\nname = \"x\"\n").is_err());
    }

    #[test]
    fn parse_rejects_invalid_redo_policy() {
        let err = RepohubConfig::parse("[session]\nredo_policy = \"sometimes\"\n").unwrap_err();
        assert!(err.path.is_none());
        assert!(!err.message.is_empty());
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let cfg = RepohubConfig::load(Path::new("/nonexistent/repohub.toml")).unwrap();
        assert_eq!(cfg, RepohubConfig::default());
    }

    #[test]
    fn resolve_requires_explicit_file_to_exist() {
        let err = RepohubConfig::resolve(Some(Path::new("/nonexistent/repohub.toml"))).unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn load_invalid_file_shows_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid [[[toml").unwrap();
        let err = RepohubConfig::load(&path).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
        assert!(err.to_string().starts_with(&path.display().to_string()));
    }
}
