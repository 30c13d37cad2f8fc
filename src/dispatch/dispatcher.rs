//! Entry point tying command lookup to the executor chain.

use std::sync::Arc;

use tracing::debug;

use super::caller::Caller;
use super::descriptor::CommandExecutable;
use super::executor::{CommandExecutor, ExecutorChain};
use super::outcome::Outcome;
use super::parser::{ArgumentParser, ParserRegistry};
use super::registry::CommandRegistry;
use super::tokenizer::TokenStream;
use crate::error::{DispatchError, Result};

/// Resolves input to a command and runs it through the executor chain.
///
/// Registration happens up front through `&mut self`; dispatching only needs
/// `&self`, so a fully built dispatcher can be shared across threads.
pub struct Dispatcher {
    registry: CommandRegistry,
    parsers: Arc<dyn ArgumentParser>,
    chain: ExecutorChain,
}

impl Dispatcher {
    /// A dispatcher using the global parser registry and the standard chain.
    pub fn new() -> Self {
        Self::with_parsers(Arc::new(ParserRegistry::global()))
    }

    /// A dispatcher using custom parsers with the standard chain.
    pub fn with_parsers(parsers: Arc<dyn ArgumentParser>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            chain: ExecutorChain::standard(Arc::clone(&parsers)),
            parsers,
        }
    }

    /// Replaces the executor chain.
    pub fn with_chain(mut self, chain: ExecutorChain) -> Self {
        self.chain = chain;
        self
    }

    /// Registers a command after checking every parameter has a parser.
    pub fn register(&mut self, executable: CommandExecutable) -> Result<()> {
        if let Some(parameter) = executable
            .parameters()
            .iter()
            .find(|p| !self.parsers.can_parse_parameter(p))
        {
            return Err(DispatchError::config(format!(
                "command '{}': no parser for parameter '{}' of type '{}'",
                executable.name(),
                parameter.name(),
                parameter.declared_type()
            )));
        }

        debug!(command = executable.name(), "registered command");
        self.registry.register(executable)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Tokenizes and dispatches one command line.
    pub fn dispatch_line(&self, line: &str, caller: &Caller) -> Outcome {
        let mut arguments = TokenStream::from_line(line);
        self.dispatch(&mut arguments, caller)
    }

    /// Resolves the command at the front of the stream and executes it.
    pub fn dispatch(&self, arguments: &mut TokenStream, caller: &Caller) -> Outcome {
        match self.registry.resolve(arguments) {
            Some(executable) => self.chain.execute(executable, arguments, caller),
            None => {
                debug!(input = ?arguments.remaining_tokens(), "no command matched");
                Outcome::UnknownCommand
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
