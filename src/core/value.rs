//! core::value
//!
//! Typed argument values and the conversions that produce them.
//!
//! # Types
//!
//! - [`Value`] - A parsed or defaulted argument value
//! - [`ValueType`] - A string-to-[`Value`] conversion function
//!
//! Configuration files only ever hold strings. Every argument carries a
//! [`ValueType`] that turns those strings (and command-line tokens) into the
//! typed [`Value`] stored in the final namespace.
//!
//! # Examples
//!
//! ```
//! use argconf::core::value::{parse_bool, Value, ValueType};
//!
//! assert_eq!(ValueType::Integer.convert("42").unwrap(), Value::Int(42));
//! assert_eq!(parse_bool("TRUE").unwrap(), true);
//! assert!(parse_bool("yes").is_err());
//! ```

use std::ffi::OsStr;
use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::sync::Arc;

use clap::builder::TypedValueParser;
use clap::error::ErrorKind;
use serde::Serialize;
use thiserror::Error;

/// Errors from converting a string into a [`Value`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    /// A boolean flag default was not one of `0`, `1`, `false`, `true`.
    #[error("Invalid boolean string: {0}")]
    InvalidBooleanString(String),

    #[error("invalid integer '{value}': {source}")]
    InvalidInteger {
        value: String,
        source: ParseIntError,
    },

    #[error("invalid float '{value}': {source}")]
    InvalidFloat {
        value: String,
        source: ParseFloatError,
    },

    /// A caller-supplied converter rejected the value.
    #[error("invalid {type_name} '{value}': {message}")]
    Custom {
        type_name: String,
        value: String,
        message: String,
    },
}

/// A typed argument value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No value (argument absent and no default).
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float view of the value; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Parse a boolean string.
///
/// Accepts `0`/`false` and `1`/`true`, case-insensitively. Anything else is
/// [`ConversionError::InvalidBooleanString`].
pub fn parse_bool(s: &str) -> Result<bool, ConversionError> {
    match s.to_ascii_lowercase().as_str() {
        "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err(ConversionError::InvalidBooleanString(s.to_string())),
    }
}

type ConvertFn = dyn Fn(&str) -> Result<Value, String> + Send + Sync;

/// A string-to-[`Value`] conversion function.
///
/// Used both for configuration defaults and for command-line values, so the
/// two sources always agree on the resulting type.
#[derive(Clone)]
pub enum ValueType {
    /// Identity conversion.
    String,
    Integer,
    Float,
    /// See [`parse_bool`].
    Boolean,
    /// Caller-supplied conversion, named for error messages.
    Custom {
        name: Arc<str>,
        convert: Arc<ConvertFn>,
    },
}

impl ValueType {
    /// Build a named custom conversion.
    ///
    /// ```
    /// use argconf::core::value::{Value, ValueType};
    ///
    /// let upper = ValueType::custom("upper", |s| Ok(Value::Str(s.to_uppercase())));
    /// assert_eq!(upper.convert("abc").unwrap(), Value::Str("ABC".into()));
    /// ```
    pub fn custom<F>(name: &str, convert: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        ValueType::Custom {
            name: Arc::from(name),
            convert: Arc::new(convert),
        }
    }

    /// Name used in help and error output.
    pub fn name(&self) -> &str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Custom { name, .. } => name,
        }
    }

    /// Convert a raw string.
    pub fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        match self {
            ValueType::String => Ok(Value::Str(raw.to_string())),
            ValueType::Integer => raw.trim().parse::<i64>().map(Value::Int).map_err(|source| {
                ConversionError::InvalidInteger {
                    value: raw.to_string(),
                    source,
                }
            }),
            ValueType::Float => raw.trim().parse::<f64>().map(Value::Float).map_err(|source| {
                ConversionError::InvalidFloat {
                    value: raw.to_string(),
                    source,
                }
            }),
            ValueType::Boolean => parse_bool(raw).map(Value::Bool),
            ValueType::Custom { name, convert } => {
                convert(raw).map_err(|message| ConversionError::Custom {
                    type_name: name.to_string(),
                    value: raw.to_string(),
                    message,
                })
            }
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Lets clap validate command-line tokens with the same conversion used for
/// configuration defaults.
impl TypedValueParser for ValueType {
    type Value = Value;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&clap::Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let raw = value.to_str().ok_or_else(|| {
            clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd)
        })?;
        self.convert(raw).map_err(|e| {
            let arg = arg
                .map(|a| a.to_string())
                .unwrap_or_else(|| "...".to_string());
            clap::Error::raw(
                ErrorKind::ValueValidation,
                format!("invalid value '{}' for '{}': {}\n", raw, arg, e),
            )
            .with_cmd(cmd)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_bool {
        use super::*;

        #[test]
        fn accepts_known_forms_any_case() {
            for s in ["0", "false", "False", "FALSE"] {
                assert_eq!(parse_bool(s), Ok(false), "{}", s);
            }
            for s in ["1", "true", "True", "TRUE"] {
                assert_eq!(parse_bool(s), Ok(true), "{}", s);
            }
        }

        #[test]
        fn rejects_other_strings() {
            for s in ["", "yes", "no", "2", "on", " true"] {
                assert_eq!(
                    parse_bool(s),
                    Err(ConversionError::InvalidBooleanString(s.to_string()))
                );
            }
        }

        #[test]
        fn error_message_names_value() {
            let err = parse_bool("maybe").unwrap_err();
            assert_eq!(err.to_string(), "Invalid boolean string: maybe");
        }
    }

    mod value_type {
        use super::*;

        #[test]
        fn string_is_identity() {
            assert_eq!(
                ValueType::String.convert(" a string ").unwrap(),
                Value::Str(" a string ".into())
            );
        }

        #[test]
        fn integer_and_float() {
            assert_eq!(ValueType::Integer.convert("1").unwrap(), Value::Int(1));
            assert_eq!(ValueType::Integer.convert("-7").unwrap(), Value::Int(-7));
            assert_eq!(ValueType::Float.convert("2.3").unwrap(), Value::Float(2.3));
        }

        #[test]
        fn integer_rejects_non_numeric() {
            let err = ValueType::Integer.convert("abc").unwrap_err();
            assert!(matches!(err, ConversionError::InvalidInteger { .. }));
            assert!(err.to_string().contains("abc"));
        }

        #[test]
        fn float_rejects_non_numeric() {
            assert!(matches!(
                ValueType::Float.convert("x1").unwrap_err(),
                ConversionError::InvalidFloat { .. }
            ));
        }

        #[test]
        fn custom_errors_carry_name() {
            let even = ValueType::custom("even", |s| {
                let n: i64 = s.parse().map_err(|_| "not a number".to_string())?;
                if n % 2 == 0 {
                    Ok(Value::Int(n))
                } else {
                    Err("odd".to_string())
                }
            });
            assert_eq!(even.convert("4").unwrap(), Value::Int(4));
            let err = even.convert("3").unwrap_err();
            assert_eq!(err.to_string(), "invalid even '3': odd");
        }
    }

    mod value {
        use super::*;

        #[test]
        fn accessors() {
            assert_eq!(Value::Int(3).as_int(), Some(3));
            assert_eq!(Value::Int(3).as_float(), Some(3.0));
            assert_eq!(Value::Bool(true).as_bool(), Some(true));
            assert_eq!(Value::from("x").as_str(), Some("x"));
            assert!(Value::None.is_none());
            assert_eq!(Value::Str("x".into()).as_int(), None);
        }

        #[test]
        fn display() {
            assert_eq!(Value::None.to_string(), "None");
            assert_eq!(Value::from(vec!["a", "b"]).to_string(), "[a, b]");
            assert_eq!(Value::Float(4.5).to_string(), "4.5");
        }

        #[test]
        fn serializes_untagged() {
            let v = Value::from(vec![Value::Int(1), Value::Bool(false), Value::None]);
            assert_eq!(serde_json::to_string(&v).unwrap(), "[1,false,null]");
        }
    }
}
