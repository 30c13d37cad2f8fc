//! Command dispatch for commandkit.
//!
//! Resolution, argument binding and policy checks are separate layers:
//! the [`registry`] maps leading tokens to a command, the [`executor`] chain
//! applies caller policy and binds parameters through the [`parser`] registry,
//! whose numeric parsers are wrapped by the [`clamp`] decorator.

pub mod caller;
pub mod clamp;
pub mod descriptor;
pub mod dispatcher;
pub mod executor;
pub mod outcome;
pub mod parser;
pub mod registry;
pub mod tokenizer;
pub mod value;

pub use caller::{Caller, DEFAULT_SENTINEL};
pub use clamp::NumericClampDecorator;
pub use descriptor::{
    CallerRestriction, ClampMethod, CommandBuilder, CommandExecutable, CommandHandler,
    ParameterDescriptor, RangeConstraint,
};
pub use dispatcher::Dispatcher;
pub use executor::{
    BindingExecutor, BoundArguments, CallerTypeCheckingExecutor, CommandExecutor, ExecutorChain,
    TracingExecutor,
};
pub use outcome::Outcome;
pub use parser::{ArgumentParser, ParserRegistry};
pub use registry::CommandRegistry;
pub use tokenizer::{tokenize, TokenStream};
pub use value::{ArgumentValue, ParamType};
