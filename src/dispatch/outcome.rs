//! Normalized result of one invocation.

use serde::Serialize;
use std::fmt;

use crate::error::DispatchError;

/// Outcome of dispatching one command.
///
/// Every failure inside the executor chain is converted into one of these before
/// it is returned; callers never see a [`DispatchError`] from `execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The handler ran and reported success.
    Success,
    /// The handler ran and reported failure.
    Failure,
    /// The caller may not run this command.
    NoPermission,
    /// A token could not be coerced to its parameter type.
    MalformedArgument,
    /// A number violated a VALIDATE range constraint.
    OutOfBounds,
    /// Too few or too many tokens for the command.
    InvalidUsage,
    /// No registered command matched the input.
    UnknownCommand,
    /// The command's declaration is broken; see the logs.
    ConfigurationError,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Process exit status used by the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::NoPermission => 2,
            Self::MalformedArgument | Self::OutOfBounds | Self::InvalidUsage => 3,
            Self::UnknownCommand => 4,
            Self::ConfigurationError => 5,
        }
    }

    /// Human readable message for the outcome.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Command completed",
            Self::Failure => "Command failed",
            Self::NoPermission => "You do not have permission to use this command",
            Self::MalformedArgument => "Invalid argument",
            Self::OutOfBounds => "Argument out of range",
            Self::InvalidUsage => "Wrong number of arguments",
            Self::UnknownCommand => "Unknown command",
            Self::ConfigurationError => "Command is misconfigured",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&DispatchError> for Outcome {
    fn from(err: &DispatchError) -> Self {
        match err {
            DispatchError::MalformedArgument { .. } => Self::MalformedArgument,
            DispatchError::MissingArgument(_) | DispatchError::UnexpectedArgument(_) => {
                Self::InvalidUsage
            }
            DispatchError::OutOfBounds(_) => Self::OutOfBounds,
            DispatchError::UnsupportedNumericType(_) | DispatchError::Config(_) => {
                Self::ConfigurationError
            }
            DispatchError::Internal(_) => Self::Failure,
        }
    }
}
