//! Argument parsers and the registry that selects them by parameter type.
//!
//! Each parser turns the leading token(s) of a [`TokenStream`] into one
//! [`ArgumentValue`]. A parser only consumes tokens when it succeeds, so a failed
//! parse leaves the stream exactly as it found it.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use super::clamp::NumericClampDecorator;
use super::descriptor::ParameterDescriptor;
use super::tokenizer::TokenStream;
use super::value::{ArgumentValue, ParamType};
use crate::error::{DispatchError, Result};

static GLOBAL_REGISTRY: LazyLock<ParserRegistry> =
    LazyLock::new(ParserRegistry::with_builtin_parsers);

/// Parses one value of a semantic type from the front of a token stream.
pub trait ArgumentParser: Send + Sync {
    /// Returns true if this parser can produce values for the parameter.
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool;

    /// Consumes the tokens for one value and returns it.
    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue>;
}

impl<P: ArgumentParser + ?Sized> ArgumentParser for &P {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        (**self).can_parse_parameter(parameter)
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        (**self).parse(arguments, parameter)
    }
}

impl<P: ArgumentParser + ?Sized> ArgumentParser for Arc<P> {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        (**self).can_parse_parameter(parameter)
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        (**self).parse(arguments, parameter)
    }
}

/// Runs `convert` on the next token and consumes it only on success.
fn parse_front<T>(
    arguments: &mut TokenStream,
    parameter: &ParameterDescriptor,
    convert: impl FnOnce(&str) -> Option<T>,
) -> Result<T> {
    let token = arguments.peek().ok_or_else(|| {
        DispatchError::missing(format!(
            "expected a {} for '{}'",
            parameter.declared_type(),
            parameter.name()
        ))
    })?;

    let value = convert(token).ok_or_else(|| {
        DispatchError::malformed(
            parameter.name(),
            format!("'{token}' is not a valid {}", parameter.declared_type()),
        )
    })?;

    arguments.advance(1);
    Ok(value)
}

/// Parser for any type with a `FromStr` impl: fixed-width integers and `BigInt`.
pub struct FromStrParser<T> {
    param_type: ParamType,
    wrap: fn(T) -> ArgumentValue,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromStr> FromStrParser<T> {
    pub fn new(param_type: ParamType, wrap: fn(T) -> ArgumentValue) -> Self {
        Self {
            param_type,
            wrap,
            _marker: PhantomData,
        }
    }
}

impl<T: FromStr> ArgumentParser for FromStrParser<T> {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.declared_type() == self.param_type
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        let wrap = self.wrap;
        parse_front(arguments, parameter, |token| token.parse::<T>().ok().map(wrap))
    }
}

/// Largest decimal scale magnitude accepted, e.g. `1e4096` or `1e-4096`.
pub const MAX_DECIMAL_SCALE: u64 = 4096;

/// Arbitrary-precision decimal parser accepting plain (`12.50`) and
/// scientific (`1.25e1`) notation.
///
/// Digits are kept exactly. The scale is bounded by [`MAX_DECIMAL_SCALE`].
pub struct DecimalParser;

impl ArgumentParser for DecimalParser {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.declared_type() == ParamType::BigDecimal
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        parse_front(arguments, parameter, |token| {
            let value = token.parse::<BigDecimal>().ok()?;
            let (_, scale) = value.as_bigint_and_exponent();
            (scale.unsigned_abs() <= MAX_DECIMAL_SCALE)
                .then_some(ArgumentValue::BigDecimal(value))
        })
    }
}

/// Floating point parser. `NaN` has no place in a total order, so it is rejected.
pub struct FloatParser {
    double: bool,
}

impl FloatParser {
    pub fn single() -> Self {
        Self { double: false }
    }

    pub fn double() -> Self {
        Self { double: true }
    }
}

impl ArgumentParser for FloatParser {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        let expected = if self.double {
            ParamType::Double
        } else {
            ParamType::Float
        };
        parameter.declared_type() == expected
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        let double = self.double;
        parse_front(arguments, parameter, |token| {
            if double {
                token
                    .parse::<f64>()
                    .ok()
                    .filter(|v| !v.is_nan())
                    .map(ArgumentValue::Double)
            } else {
                token
                    .parse::<f32>()
                    .ok()
                    .filter(|v| !v.is_nan())
                    .map(ArgumentValue::Float)
            }
        })
    }
}

/// Accepts `true` or `false`, ignoring case.
pub struct BooleanParser;

impl ArgumentParser for BooleanParser {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.declared_type() == ParamType::Boolean
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        parse_front(arguments, parameter, |token| {
            if token.eq_ignore_ascii_case("true") {
                Some(ArgumentValue::Boolean(true))
            } else if token.eq_ignore_ascii_case("false") {
                Some(ArgumentValue::Boolean(false))
            } else {
                None
            }
        })
    }
}

/// Accepts a token of exactly one character.
pub struct CharParser;

impl ArgumentParser for CharParser {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.declared_type() == ParamType::Char
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        parse_front(arguments, parameter, |token| {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(ArgumentValue::Char(c)),
                _ => None,
            }
        })
    }
}

/// Takes one token verbatim.
pub struct StringParser;

impl ArgumentParser for StringParser {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.declared_type() == ParamType::String
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        parse_front(arguments, parameter, |token| {
            Some(ArgumentValue::String(token.to_string()))
        })
    }
}

/// Parsers keyed by declared parameter type.
///
/// Built once and read-only afterwards; [`ParserRegistry::global`] holds the
/// process-wide instance with every built-in parser.
pub struct ParserRegistry {
    parsers: HashMap<ParamType, Box<dyn ArgumentParser>>,
}

impl ParserRegistry {
    /// A registry with no parsers.
    pub fn empty() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// A registry with a parser for every [`ParamType`].
    pub fn with_builtin_parsers() -> Self {
        let mut registry = Self::empty();
        registry.register(
            ParamType::Byte,
            FromStrParser::<i8>::new(ParamType::Byte, ArgumentValue::Byte),
        );
        registry.register(
            ParamType::Short,
            FromStrParser::<i16>::new(ParamType::Short, ArgumentValue::Short),
        );
        registry.register(
            ParamType::Int,
            FromStrParser::<i32>::new(ParamType::Int, ArgumentValue::Int),
        );
        registry.register(
            ParamType::Long,
            FromStrParser::<i64>::new(ParamType::Long, ArgumentValue::Long),
        );
        registry.register(ParamType::Float, FloatParser::single());
        registry.register(ParamType::Double, FloatParser::double());
        registry.register(
            ParamType::BigInteger,
            FromStrParser::<BigInt>::new(ParamType::BigInteger, ArgumentValue::BigInteger),
        );
        registry.register(ParamType::BigDecimal, DecimalParser);
        registry.register(ParamType::Boolean, BooleanParser);
        registry.register(ParamType::Char, CharParser);
        registry.register(ParamType::String, StringParser);
        registry
    }

    /// The process-wide registry, built on first access.
    pub fn global() -> &'static ParserRegistry {
        &GLOBAL_REGISTRY
    }

    /// Registers a parser, replacing any previous parser for the type.
    ///
    /// Parsers for numeric types are always wrapped in a
    /// [`NumericClampDecorator`], so range constraints hold no matter which
    /// parser produces the value.
    pub fn register<P>(&mut self, param_type: ParamType, parser: P) -> &mut Self
    where
        P: ArgumentParser + 'static,
    {
        let parser: Box<dyn ArgumentParser> = if param_type.is_numeric() {
            Box::new(NumericClampDecorator::new(parser))
        } else {
            Box::new(parser)
        };
        self.parsers.insert(param_type, parser);
        self
    }

    /// Returns true if a parser is registered for the type.
    pub fn has_parser(&self, param_type: ParamType) -> bool {
        self.parsers.contains_key(&param_type)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_builtin_parsers()
    }
}

impl ArgumentParser for ParserRegistry {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        self.parsers
            .get(&parameter.declared_type())
            .is_some_and(|parser| parser.can_parse_parameter(parameter))
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        let parser = self.parsers.get(&parameter.declared_type()).ok_or_else(|| {
            DispatchError::config(format!(
                "no parser registered for type '{}'",
                parameter.declared_type()
            ))
        })?;
        parser.parse(arguments, parameter)
    }
}
