//! # Structured Fields
//!
//! Typed key/value pairs attached to a log record.
//!
//! Fields keep the order in which they were supplied; encoders emit them in
//! that order after the fixed record keys.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::time::Duration;

/// Key used by [`Field::error`].
pub const ERROR_KEY: &str = "error";

/// Value of a structured field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue
{
    /// UTF-8 string
    String(String),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    Uint(u64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Rendered error message
    Error(String),
    /// Elapsed time, encoded as seconds
    Duration(Duration),
}

/// A single structured key/value pair
#[derive(Debug, Clone, PartialEq)]
pub struct Field
{
    /// Field name
    pub key: Cow<'static, str>,
    /// Field value
    pub value: FieldValue,
}

impl Field
{
    /// Build a field from any key and value.
    pub fn new(key: impl Into<Cow<'static, str>>, value: FieldValue) -> Self
    {
        Self { key: key.into(), value }
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self
    {
        Self::new(key, FieldValue::String(value.into()))
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self
    {
        Self::new(key, FieldValue::Int(value))
    }

    pub fn uint(key: impl Into<Cow<'static, str>>, value: u64) -> Self
    {
        Self::new(key, FieldValue::Uint(value))
    }

    pub fn float(key: impl Into<Cow<'static, str>>, value: f64) -> Self
    {
        Self::new(key, FieldValue::Float(value))
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self
    {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Self
    {
        Self::new(key, FieldValue::Duration(value))
    }

    /// Error under the conventional `error` key, rendered with `Display`.
    pub fn error(err: &(dyn StdError + 'static)) -> Self
    {
        Self::named_error(ERROR_KEY, err)
    }

    /// Error under a caller-chosen key.
    pub fn named_error(key: impl Into<Cow<'static, str>>, err: &(dyn StdError + 'static)) -> Self
    {
        Self::new(key, FieldValue::Error(err.to_string()))
    }
}
