//! Command-line argument parsing for commandkit.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Dispatches command lines against a TOML command manifest.
#[derive(Parser, Debug)]
#[command(name = "commandkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Command manifest path
    #[arg(short = 'm', long, value_name = "PATH", env = "COMMANDKIT_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Display name of the caller (the manifest's sentinel name means the console)
    #[arg(short = 'c', long, value_name = "NAME")]
    pub caller: Option<String>,

    /// Print outcomes as JSON lines
    #[arg(long)]
    pub json: bool,

    /// List registered commands and exit
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Write logs to a file instead of stderr (defaults to the state directory)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<Option<PathBuf>>,

    /// Command line to dispatch; lines are read from stdin when omitted
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the manifest path to use.
    ///
    /// Uses the --manifest argument if provided, otherwise the default path.
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the log file path, if file logging was requested.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_ref()
            .map(|path| path.clone().unwrap_or_else(crate::logging::get_log_path))
    }

    /// Returns the caller display name, defaulting to the sentinel.
    pub fn caller_name<'a>(&'a self, config: &'a Config) -> &'a str {
        self.caller.as_deref().unwrap_or(&config.caller.sentinel)
    }

    /// Returns true if a command line was given on the command line.
    pub fn has_inline_command(&self) -> bool {
        !self.tokens.is_empty()
    }
}
