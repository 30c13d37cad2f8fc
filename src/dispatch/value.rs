//! Semantic parameter types and the values parsed for them.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a command parameter.
///
/// This is a closed set: every variant has a built-in parser, and every numeric
/// variant has a bounds implementation in [`clamp`](super::clamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// 8-bit signed integer.
    Byte,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    #[serde(alias = "integer")]
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Arbitrary-precision integer.
    #[serde(rename = "biginteger")]
    BigInteger,
    /// Arbitrary-precision decimal.
    #[serde(rename = "bigdecimal")]
    BigDecimal,
    /// `true` or `false`.
    #[serde(alias = "bool")]
    Boolean,
    /// Exactly one character.
    Char,
    /// One token taken verbatim.
    String,
}

impl ParamType {
    /// Every built-in type, in declaration order.
    pub const ALL: [ParamType; 11] = [
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::BigInteger,
        Self::BigDecimal,
        Self::Boolean,
        Self::Char,
        Self::String,
    ];

    /// Returns true if values of this type can carry a range constraint.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Boolean | Self::Char | Self::String)
    }

    /// Returns the name used in manifests and messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::BigInteger => "biginteger",
            Self::BigDecimal => "bigdecimal",
            Self::Boolean => "boolean",
            Self::Char => "char",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value bound to a parameter after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigInteger(BigInt),
    BigDecimal(BigDecimal),
    Boolean(bool),
    Char(char),
    String(String),
}

impl ArgumentValue {
    /// Returns the semantic type of the value's runtime variant.
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Byte(_) => ParamType::Byte,
            Self::Short(_) => ParamType::Short,
            Self::Int(_) => ParamType::Int,
            Self::Long(_) => ParamType::Long,
            Self::Float(_) => ParamType::Float,
            Self::Double(_) => ParamType::Double,
            Self::BigInteger(_) => ParamType::BigInteger,
            Self::BigDecimal(_) => ParamType::BigDecimal,
            Self::Boolean(_) => ParamType::Boolean,
            Self::Char(_) => ParamType::Char,
            Self::String(_) => ParamType::String,
        }
    }

    /// Converts the value to JSON. Arbitrary-precision values become strings.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Byte(v) => Value::from(*v),
            Self::Short(v) => Value::from(*v),
            Self::Int(v) => Value::from(*v),
            Self::Long(v) => Value::from(*v),
            Self::Float(v) => Value::from(*v),
            Self::Double(v) => Value::from(*v),
            Self::BigInteger(v) => Value::String(v.to_string()),
            Self::BigDecimal(v) => Value::String(v.to_string()),
            Self::Boolean(v) => Value::Bool(*v),
            Self::Char(v) => Value::String(v.to_string()),
            Self::String(v) => Value::String(v.clone()),
        }
    }
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::BigInteger(v) => write!(f, "{v}"),
            Self::BigDecimal(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}
