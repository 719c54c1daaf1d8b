//! Configuration for the `todo` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/todo/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;

use todo_proto::{Priority, TodoId};

use crate::gateway::DEFAULT_SERVER_URL;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
}

/// `[server]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    url: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the todo server.
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            server_url: cli
                .server_url
                .clone()
                .or_else(|| file.server.url.clone())
                .unwrap_or(defaults.server_url),
        }
    }
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Manage your todo list from the terminal")]
pub struct CliArgs {
    /// Base URL of the todo server.
    #[arg(long, global = true, env = "TODO_SERVER_URL")]
    pub server_url: Option<String>,

    /// Path to config file (default: `~/.config/todo/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log file path (default: `$TMPDIR/todo-client.log`).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// What to do. Lists todos when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// `todo` subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List todos, optionally filtered by keyword.
    List {
        /// Case-insensitive filter over title and description.
        #[arg(short, long)]
        keyword: Option<String>,
    },
    /// Show one todo in detail.
    Show {
        /// Todo id.
        id: TodoId,
    },
    /// Create a todo.
    Add {
        /// Title of the new todo.
        title: String,
        /// Longer notes.
        #[arg(short, long)]
        description: Option<String>,
        /// Due date, e.g. `2026-01-21` or `2026-01-21T17:00`.
        #[arg(long)]
        due: Option<String>,
        /// HIGH, MEDIUM or LOW.
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Flip a todo between open and done.
    Toggle {
        /// Todo id.
        id: TodoId,
    },
    /// Rename a todo.
    Edit {
        /// Todo id.
        id: TodoId,
        /// New title.
        title: String,
    },
    /// Delete a todo.
    Rm {
        /// Todo id.
        id: TodoId,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

impl Command {
    /// Whether the command works on the loaded list.
    ///
    /// `show` talks to the server directly, so a failing list load must not
    /// stop it.
    #[must_use]
    pub const fn needs_list(&self) -> bool {
        !matches!(self, Self::Show { .. })
    }
}

fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("todo").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
