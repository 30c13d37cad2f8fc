//! Configuration management for commandkit.
//!
//! Loads a TOML command manifest declaring commands, their parameters and
//! constraints, and the display name the host uses for the console caller.

use crate::dispatch::{
    Caller, CommandExecutable, CommandHandler, Dispatcher, ParamType, ParameterDescriptor,
    RangeConstraint, DEFAULT_SENTINEL,
};
use crate::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main configuration structure for commandkit.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Caller classification settings.
    #[serde(default)]
    pub caller: CallerConfig,

    /// Declared commands, in registration order.
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

/// How the host adapter classifies callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallerConfig {
    /// Display name reserved for the non-interactive caller.
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
        }
    }
}

/// One `[[commands]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandConfig {
    /// Dispatch name; subcommands use several words (e.g. "warp set").
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Only interactive callers may run the command.
    #[serde(default)]
    pub interactive_only: bool,

    /// Only the non-interactive caller may run the command.
    #[serde(default)]
    pub non_interactive_only: bool,

    /// Parameters in binding order.
    #[serde(default)]
    pub params: Vec<ParamConfig>,
}

/// One `[[commands.params]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub param_type: ParamType,

    /// Optional numeric range, e.g. `range = { min = 0, max = 10, method = "LIMIT" }`.
    #[serde(default)]
    pub range: Option<RangeConstraint>,
}

impl ParamConfig {
    fn to_descriptor(&self) -> ParameterDescriptor {
        let descriptor = ParameterDescriptor::new(&self.name, self.param_type);
        match self.range {
            Some(range) => descriptor.with_range(range),
            None => descriptor,
        }
    }
}

impl CommandConfig {
    /// Builds the command descriptor, bound to `handler`.
    pub fn to_executable(&self, handler: Arc<dyn CommandHandler>) -> Result<CommandExecutable> {
        let mut builder = CommandExecutable::builder(&self.name)
            .description(&self.description)
            .shared_handler(handler);
        if self.interactive_only {
            builder = builder.interactive_only();
        }
        if self.non_interactive_only {
            builder = builder.non_interactive_only();
        }
        for param in &self.params {
            builder = builder.param(param.to_descriptor());
        }
        builder.build()
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("commandkit")
            .join("commands.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DispatchError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            DispatchError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Classifies a host display name using the configured sentinel.
    pub fn caller_for(&self, display_name: &str) -> Caller {
        Caller::from_display_name(display_name, &self.caller.sentinel)
    }

    /// Registers every declared command, asking `handler_for` for each handler.
    ///
    /// Fails on the first invalid declaration, so a broken manifest never
    /// produces a partially usable dispatcher.
    pub fn build_dispatcher<F>(&self, mut handler_for: F) -> Result<Dispatcher>
    where
        F: FnMut(&CommandConfig) -> Arc<dyn CommandHandler>,
    {
        let mut dispatcher = Dispatcher::new();
        for command in &self.commands {
            dispatcher.register(command.to_executable(handler_for(command))?)?;
        }
        Ok(dispatcher)
    }
}
