//! Range enforcement for numeric parameters.
//!
//! [`NumericClampDecorator`] wraps any numeric parser and applies the parameter's
//! [`RangeConstraint`] after parsing. The wrapped parser never sees the constraint.
//!
//! Bounds checks run in the parsed value's own domain: the `i64` bounds are
//! converted into `i8`, `i16`, `i32`, `i64`, `f32`, `f64`, `BigInt` or `BigDecimal`
//! and compared there, so arbitrary-precision values are never narrowed.

use std::fmt::Display;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use tracing::error;

use super::descriptor::{ClampMethod, ParameterDescriptor, RangeConstraint};
use super::parser::ArgumentParser;
use super::tokenizer::TokenStream;
use super::value::ArgumentValue;
use crate::error::{DispatchError, Result};

/// A numeric domain with its own ordering and a conversion for range bounds.
trait NumericDomain: PartialOrd + Display + Sized {
    fn bounds(range: &RangeConstraint) -> Result<(Self, Self)>;
}

/// Converts a bound into a fixed-width integer, failing if it does not fit.
fn fixed_width_bound<T: TryFrom<i64>>(bound: i64, type_name: &str) -> Result<T> {
    T::try_from(bound).map_err(|_| {
        DispatchError::config(format!("range bound {bound} does not fit in {type_name}"))
    })
}

macro_rules! fixed_width_domain {
    ($($t:ty),*) => {
        $(
            impl NumericDomain for $t {
                fn bounds(range: &RangeConstraint) -> Result<(Self, Self)> {
                    Ok((
                        fixed_width_bound(range.min, stringify!($t))?,
                        fixed_width_bound(range.max, stringify!($t))?,
                    ))
                }
            }
        )*
    };
}

fixed_width_domain!(i8, i16, i32, i64);

impl NumericDomain for f32 {
    fn bounds(range: &RangeConstraint) -> Result<(Self, Self)> {
        Ok((range.min as f32, range.max as f32))
    }
}

impl NumericDomain for f64 {
    fn bounds(range: &RangeConstraint) -> Result<(Self, Self)> {
        Ok((range.min as f64, range.max as f64))
    }
}

impl NumericDomain for BigInt {
    fn bounds(range: &RangeConstraint) -> Result<(Self, Self)> {
        Ok((BigInt::from(range.min), BigInt::from(range.max)))
    }
}

impl NumericDomain for BigDecimal {
    fn bounds(range: &RangeConstraint) -> Result<(Self, Self)> {
        Ok((BigDecimal::from(range.min), BigDecimal::from(range.max)))
    }
}

fn ensure_in_bounds<T: NumericDomain>(value: &T, range: &RangeConstraint) -> Result<()> {
    let (min, max) = T::bounds(range)?;
    if *value > max {
        return Err(DispatchError::out_of_bounds(format!(
            "Number {value} must be less than or equal to {max}"
        )));
    }
    if *value < min {
        return Err(DispatchError::out_of_bounds(format!(
            "Number {value} must be more than or equal to {min}"
        )));
    }
    Ok(())
}

fn limit_to<T: NumericDomain>(value: T, range: &RangeConstraint) -> Result<T> {
    let (min, max) = T::bounds(range)?;
    Ok(if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    })
}

fn unsupported(value: &ArgumentValue) -> DispatchError {
    DispatchError::unsupported_numeric(format!(
        "range constraints cannot apply to {} values",
        value.param_type()
    ))
}

/// Fails with `OutOfBounds` if `value` lies outside `[range.min, range.max]`.
pub fn validate(value: &ArgumentValue, range: &RangeConstraint) -> Result<()> {
    match value {
        ArgumentValue::Byte(v) => ensure_in_bounds(v, range),
        ArgumentValue::Short(v) => ensure_in_bounds(v, range),
        ArgumentValue::Int(v) => ensure_in_bounds(v, range),
        ArgumentValue::Long(v) => ensure_in_bounds(v, range),
        ArgumentValue::Float(v) => ensure_in_bounds(v, range),
        ArgumentValue::Double(v) => ensure_in_bounds(v, range),
        ArgumentValue::BigInteger(v) => ensure_in_bounds(v, range),
        ArgumentValue::BigDecimal(v) => ensure_in_bounds(v, range),
        ArgumentValue::Boolean(_) | ArgumentValue::Char(_) | ArgumentValue::String(_) => {
            Err(unsupported(value))
        }
    }
}

/// Clamps `value` into `[range.min, range.max]`.
pub fn limit(value: ArgumentValue, range: &RangeConstraint) -> Result<ArgumentValue> {
    Ok(match value {
        ArgumentValue::Byte(v) => ArgumentValue::Byte(limit_to(v, range)?),
        ArgumentValue::Short(v) => ArgumentValue::Short(limit_to(v, range)?),
        ArgumentValue::Int(v) => ArgumentValue::Int(limit_to(v, range)?),
        ArgumentValue::Long(v) => ArgumentValue::Long(limit_to(v, range)?),
        ArgumentValue::Float(v) => ArgumentValue::Float(limit_to(v, range)?),
        ArgumentValue::Double(v) => ArgumentValue::Double(limit_to(v, range)?),
        ArgumentValue::BigInteger(v) => ArgumentValue::BigInteger(limit_to(v, range)?),
        ArgumentValue::BigDecimal(v) => ArgumentValue::BigDecimal(limit_to(v, range)?),
        ArgumentValue::Boolean(_) | ArgumentValue::Char(_) | ArgumentValue::String(_) => {
            return Err(unsupported(&value))
        }
    })
}

/// Applies a range constraint according to its method.
pub fn apply(value: ArgumentValue, range: &RangeConstraint) -> Result<ArgumentValue> {
    match range.method {
        ClampMethod::Validate => validate(&value, range).map(|()| value),
        ClampMethod::Limit => limit(value, range),
    }
}

/// Wraps a numeric parser with post-parse range enforcement.
pub struct NumericClampDecorator {
    parser: Box<dyn ArgumentParser>,
}

impl NumericClampDecorator {
    pub fn new<P>(parser: P) -> Self
    where
        P: ArgumentParser + 'static,
    {
        Self {
            parser: Box::new(parser),
        }
    }
}

impl ArgumentParser for NumericClampDecorator {
    fn can_parse_parameter(&self, parameter: &ParameterDescriptor) -> bool {
        self.parser.can_parse_parameter(parameter)
    }

    fn parse(
        &self,
        arguments: &mut TokenStream,
        parameter: &ParameterDescriptor,
    ) -> Result<ArgumentValue> {
        let mark = arguments.position();
        let value = self.parser.parse(arguments, parameter)?;

        let Some(range) = parameter.range() else {
            return Ok(value);
        };

        apply(value, range).inspect_err(|e| {
            arguments.rewind_to(mark);
            if e.is_configuration_defect() {
                error!(parameter = parameter.name(), "{}: {}", e.category(), e);
            }
        })
    }
}
