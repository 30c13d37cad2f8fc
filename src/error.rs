//! Error types for commandkit.
//!
//! Defines the error enum used while parsing arguments and building descriptors.
//! Errors never leave the executor chain: the terminal link converts them into
//! [`Outcome`](crate::dispatch::Outcome) values.

use thiserror::Error;

/// Main error type for commandkit operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A token could not be coerced into the declared parameter type.
    #[error("Malformed argument for '{parameter}': {message}")]
    MalformedArgument { parameter: String, message: String },

    /// The token stream ran out before every parameter was bound.
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// Tokens were left over after every parameter was bound.
    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    /// A parsed number violated a VALIDATE range constraint.
    #[error("Argument out of bounds: {0}")]
    OutOfBounds(String),

    /// A range constraint reached a value with no numeric domain.
    #[error("Unsupported numeric type: {0}")]
    UnsupportedNumericType(String),

    /// Invalid descriptor or manifest (bad bounds, conflicting restrictions, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (I/O in the binary, unexpected states).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// Creates a malformed-argument error for the named parameter.
    pub fn malformed(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedArgument {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Creates a missing-argument error with the given message.
    pub fn missing(msg: impl Into<String>) -> Self {
        Self::MissingArgument(msg.into())
    }

    /// Creates an unexpected-argument error with the given message.
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedArgument(msg.into())
    }

    /// Creates an out-of-bounds error with the given message.
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    /// Creates an unsupported-numeric-type error with the given message.
    pub fn unsupported_numeric(msg: impl Into<String>) -> Self {
        Self::UnsupportedNumericType(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedArgument { .. } => "Malformed Argument",
            Self::MissingArgument(_) => "Missing Argument",
            Self::UnexpectedArgument(_) => "Unexpected Argument",
            Self::OutOfBounds(_) => "Out Of Bounds",
            Self::UnsupportedNumericType(_) => "Unsupported Numeric Type",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true for defects in declarations rather than in user input.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(self, Self::UnsupportedNumericType(_) | Self::Config(_))
    }
}

/// Result type alias using DispatchError.
pub type Result<T> = std::result::Result<T, DispatchError>;
