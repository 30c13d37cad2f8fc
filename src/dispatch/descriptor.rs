//! Registration-time metadata for commands and their parameters.
//!
//! Descriptors are built once, validated by [`CommandBuilder::build`], and are
//! read-only afterwards.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::caller::Caller;
use super::executor::BoundArguments;
use super::outcome::Outcome;
use super::value::ParamType;
use crate::error::{DispatchError, Result};

/// Lowercase words separated by single spaces, e.g. `"warp set"`.
static COMMAND_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_:.-]*( [a-z0-9][a-z0-9_:.-]*)*$").expect("valid regex")
});

/// How a range constraint treats out-of-range values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClampMethod {
    /// Reject values outside `[min, max]`.
    #[default]
    #[serde(alias = "validate")]
    Validate,
    /// Clamp values into `[min, max]`.
    #[serde(alias = "limit")]
    Limit,
}

/// Numeric range constraint attached to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeConstraint {
    pub min: i64,
    pub max: i64,
    #[serde(default)]
    pub method: ClampMethod,
}

impl RangeConstraint {
    /// A constraint that rejects out-of-range values.
    pub fn validate(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            method: ClampMethod::Validate,
        }
    }

    /// A constraint that clamps out-of-range values.
    pub fn limit(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            method: ClampMethod::Limit,
        }
    }
}

/// Which kind of caller may reach a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallerRestriction {
    #[default]
    None,
    InteractiveOnly,
    NonInteractiveOnly,
}

impl CallerRestriction {
    /// Builds a restriction from the two declaration flags.
    ///
    /// Declaring both is a configuration error.
    pub fn from_flags(interactive_only: bool, non_interactive_only: bool) -> Result<Self> {
        match (interactive_only, non_interactive_only) {
            (false, false) => Ok(Self::None),
            (true, false) => Ok(Self::InteractiveOnly),
            (false, true) => Ok(Self::NonInteractiveOnly),
            (true, true) => Err(DispatchError::config(
                "a command cannot be both interactive-only and non-interactive-only",
            )),
        }
    }
}

/// Metadata about one declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    name: String,
    declared_type: ParamType,
    range: Option<RangeConstraint>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, declared_type: ParamType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            range: None,
        }
    }

    /// Attaches a numeric range constraint.
    pub fn with_range(mut self, range: RangeConstraint) -> Self {
        self.range = Some(range);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> ParamType {
        self.declared_type
    }

    /// The range constraint, if one applies to this parameter.
    pub fn range(&self) -> Option<&RangeConstraint> {
        self.range.as_ref()
    }

    /// Checks the invariants a parameter must satisfy at registration time.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DispatchError::config("parameter name must not be empty"));
        }
        if let Some(range) = &self.range {
            if !self.declared_type.is_numeric() {
                return Err(DispatchError::config(format!(
                    "parameter '{}' has a range constraint but type '{}' is not numeric",
                    self.name, self.declared_type
                )));
            }
            if range.min > range.max {
                return Err(DispatchError::config(format!(
                    "parameter '{}' has range min {} greater than max {}",
                    self.name, range.min, range.max
                )));
            }
            let fits = match self.declared_type {
                ParamType::Byte => {
                    i8::try_from(range.min).is_ok() && i8::try_from(range.max).is_ok()
                }
                ParamType::Short => {
                    i16::try_from(range.min).is_ok() && i16::try_from(range.max).is_ok()
                }
                ParamType::Int => {
                    i32::try_from(range.min).is_ok() && i32::try_from(range.max).is_ok()
                }
                _ => true,
            };
            if !fits {
                return Err(DispatchError::config(format!(
                    "parameter '{}' has range {}..={} outside the {} domain",
                    self.name, range.min, range.max, self.declared_type
                )));
            }
        }
        Ok(())
    }
}

/// Application code invoked once every parameter is bound.
pub trait CommandHandler: Send + Sync {
    fn handle(&self, caller: &Caller, arguments: &BoundArguments) -> Outcome;
}

impl<F> CommandHandler for F
where
    F: Fn(&Caller, &BoundArguments) -> Outcome + Send + Sync,
{
    fn handle(&self, caller: &Caller, arguments: &BoundArguments) -> Outcome {
        self(caller, arguments)
    }
}

/// Metadata about one invocable command or subcommand.
#[derive(Clone)]
pub struct CommandExecutable {
    name: String,
    description: String,
    caller_restriction: CallerRestriction,
    parameters: Arc<[ParameterDescriptor]>,
    handler: Arc<dyn CommandHandler>,
}

impl CommandExecutable {
    /// Starts building a command with the given dispatch name.
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    /// Dispatch key, words separated by single spaces.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn caller_restriction(&self) -> CallerRestriction {
        self.caller_restriction
    }

    /// Parameters in binding order.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn handler(&self) -> &dyn CommandHandler {
        self.handler.as_ref()
    }

    /// One-line usage string, e.g. `give <player:string> <amount:int 0..=64>`.
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        for param in self.parameters.iter() {
            usage.push_str(&format!(" <{}:{}", param.name(), param.declared_type()));
            if let Some(range) = param.range() {
                usage.push_str(&format!(" {}..={}", range.min, range.max));
            }
            usage.push('>');
        }
        usage
    }
}

impl fmt::Debug for CommandExecutable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecutable")
            .field("name", &self.name)
            .field("caller_restriction", &self.caller_restriction)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CommandExecutable`].
pub struct CommandBuilder {
    name: String,
    description: String,
    interactive_only: bool,
    non_interactive_only: bool,
    parameters: Vec<ParameterDescriptor>,
    handler: Option<Arc<dyn CommandHandler>>,
}

impl CommandBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            interactive_only: false,
            non_interactive_only: false,
            parameters: Vec::new(),
            handler: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restricts the command to interactive callers.
    pub fn interactive_only(mut self) -> Self {
        self.interactive_only = true;
        self
    }

    /// Restricts the command to the non-interactive caller.
    pub fn non_interactive_only(mut self) -> Self {
        self.non_interactive_only = true;
        self
    }

    /// Appends a parameter; parameters bind in the order they are added.
    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Caller, &BoundArguments) -> Outcome + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Uses a shared handler, e.g. one bound to several commands.
    pub fn shared_handler(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Validates the declaration and freezes it.
    pub fn build(self) -> Result<CommandExecutable> {
        let name = normalize_name(&self.name);
        if !COMMAND_NAME.is_match(&name) {
            return Err(DispatchError::config(format!(
                "invalid command name '{}'",
                self.name
            )));
        }

        let caller_restriction =
            CallerRestriction::from_flags(self.interactive_only, self.non_interactive_only)
                .map_err(|e| in_command(&name, e))?;

        for param in &self.parameters {
            param.validate().map_err(|e| in_command(&name, e))?;
        }

        let handler = self
            .handler
            .ok_or_else(|| DispatchError::config(format!("command '{name}' has no handler")))?;

        Ok(CommandExecutable {
            name,
            description: self.description,
            caller_restriction,
            parameters: self.parameters.into(),
            handler,
        })
    }
}

/// Prefixes a configuration error with the command it belongs to.
fn in_command(name: &str, err: DispatchError) -> DispatchError {
    match err {
        DispatchError::Config(msg) => DispatchError::config(format!("command '{name}': {msg}")),
        other => other,
    }
}

/// Lowercases a command name and collapses runs of whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
