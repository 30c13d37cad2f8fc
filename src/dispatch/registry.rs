//! Command tree: resolves the leading tokens of a line to a registered command.

use std::collections::HashMap;

use super::descriptor::{normalize_name, CommandExecutable};
use super::tokenizer::TokenStream;
use crate::error::{DispatchError, Result};

/// Registered commands keyed by their (possibly multi-word) names.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandExecutable>,
    /// Word count of the longest registered name.
    max_depth: usize,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a command. Registering the same name twice is a configuration error.
    pub fn register(&mut self, executable: CommandExecutable) -> Result<()> {
        let name = executable.name().to_string();
        if self.commands.contains_key(&name) {
            return Err(DispatchError::config(format!(
                "command '{name}' is already registered"
            )));
        }

        self.max_depth = self.max_depth.max(name.split(' ').count());
        self.commands.insert(name, executable);
        Ok(())
    }

    /// Looks up a command by name (case and spacing are normalized).
    pub fn get(&self, name: &str) -> Option<&CommandExecutable> {
        self.commands.get(&normalize_name(name))
    }

    /// Matches the longest registered name at the front of the stream and
    /// consumes its tokens. On no match the stream is left untouched.
    pub fn resolve(&self, arguments: &mut TokenStream) -> Option<&CommandExecutable> {
        let depth = self.max_depth.min(arguments.remaining());
        for words in (1..=depth).rev() {
            let key = (0..words)
                .filter_map(|offset| arguments.peek_nth(offset))
                .map(str::to_lowercase)
                .collect::<Vec<_>>()
                .join(" ");

            if let Some(executable) = self.commands.get(&key) {
                arguments.advance(words);
                return Some(executable);
            }
        }
        None
    }

    /// All commands, sorted by name.
    pub fn commands(&self) -> Vec<&CommandExecutable> {
        let mut commands: Vec<_> = self.commands.values().collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
