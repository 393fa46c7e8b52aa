//! Value module for odata-query
//!
//! This module defines the Value enum, representing literal values inside
//! expressions as well as property values carried by decoded responses.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::errors::{ODataError, Result};

/// Property name -> value mapping of a single entry
pub type Properties = BTreeMap<String, Value>;

/// The different kinds of values handled by the client core
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Binary data
    Binary(Vec<u8>),
    /// GUID value
    Guid(Uuid),
    /// Date and time with offset
    DateTime(DateTime<FixedOffset>),
    /// Member of a schema enumeration
    Enum {
        /// Enumeration type name (simple or qualified)
        type_name: String,
        /// Member name
        member: String,
    },
    /// Ordered collection of values
    Array(Vec<Value>),
    /// Complex value or nested entry
    Object(Properties),
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if the value is an enumeration member
    pub fn is_enum(&self) -> bool {
        matches!(self, Value::Enum { .. })
    }

    /// Check if the value is a property mapping
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Borrow the property mapping of an object value
    pub fn as_object(&self) -> Option<&Properties> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Get a string representation of the value's type
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Guid(_) => "guid",
            Value::DateTime(_) => "datetime",
            Value::Enum { .. } => "enum",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Render a scalar as plain text, without quotes.
    ///
    /// Arrays and objects have no textual form and yield `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Binary(data) => Some(STANDARD.encode(data)),
            Value::Guid(g) => Some(g.to_string()),
            Value::DateTime(dt) => Some(dt.to_rfc3339()),
            Value::Enum { member, .. } => Some(member.clone()),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Try to coerce the value into the given target type.
    ///
    /// Returns `None` when no lossless (or invariant-rounding) conversion
    /// exists; the caller decides whether to keep the original value.
    pub fn convert_to(&self, target: TargetType) -> Option<Value> {
        match target {
            TargetType::Boolean => match self {
                Value::Boolean(b) => Some(Value::Boolean(*b)),
                Value::Integer(i) => Some(Value::Boolean(*i != 0)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(Value::Boolean(true)),
                    "false" => Some(Value::Boolean(false)),
                    _ => None,
                },
                _ => None,
            },
            TargetType::Byte => self.to_integer_in(i64::from(u8::MIN), i64::from(u8::MAX)),
            TargetType::Int16 => self.to_integer_in(i64::from(i16::MIN), i64::from(i16::MAX)),
            TargetType::Int32 => self.to_integer_in(i64::from(i32::MIN), i64::from(i32::MAX)),
            TargetType::Int64 => self.to_integer_in(i64::MIN, i64::MAX),
            TargetType::Single | TargetType::Double | TargetType::Decimal => match self {
                Value::Integer(i) => Some(Value::Float(*i as f64)),
                Value::Float(f) => Some(Value::Float(*f)),
                Value::Boolean(b) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
                Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Float),
                _ => None,
            },
            TargetType::String => self.as_text().map(Value::String),
            TargetType::Guid => match self {
                Value::Guid(g) => Some(Value::Guid(*g)),
                Value::String(s) => Uuid::parse_str(s.trim()).ok().map(Value::Guid),
                _ => None,
            },
            TargetType::DateTimeOffset => match self {
                Value::DateTime(dt) => Some(Value::DateTime(*dt)),
                Value::String(s) => parse_datetime(s).map(Value::DateTime),
                _ => None,
            },
            TargetType::Binary => match self {
                Value::Binary(data) => Some(Value::Binary(data.clone())),
                Value::String(s) => STANDARD.decode(s.trim()).ok().map(Value::Binary),
                _ => None,
            },
        }
    }

    fn to_integer_in(&self, min: i64, max: i64) -> Option<Value> {
        let i = match self {
            Value::Integer(i) => *i,
            Value::Float(f) => {
                let rounded = f.round_ties_even();
                if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
                    return None;
                }
                rounded as i64
            }
            Value::Boolean(b) => i64::from(*b),
            Value::String(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };

        if i < min || i > max {
            return None;
        }

        Some(Value::Integer(i))
    }

    /// Convert into a JSON value for display purposes
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            other => serde_json::Value::String(other.as_text().unwrap_or_default()),
        }
    }
}

/// Parse an ISO 8601 timestamp, with or without offset (UTC assumed)
pub(crate) fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Format a Value as a string
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Binary(data) => write!(f, "[binary data: {} bytes]", data.len()),
            Value::Guid(g) => write!(f, "{}", g),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Enum { type_name, member } => write!(f, "{}'{}'", type_name, member),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Object(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

/// Target types of an explicit conversion node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Boolean,
    Byte,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    String,
    Guid,
    DateTimeOffset,
    Binary,
}

impl TargetType {
    /// Name of the target type as used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            TargetType::Boolean => "Boolean",
            TargetType::Byte => "Byte",
            TargetType::Int16 => "Int16",
            TargetType::Int32 => "Int32",
            TargetType::Int64 => "Int64",
            TargetType::Single => "Single",
            TargetType::Double => "Double",
            TargetType::Decimal => "Decimal",
            TargetType::String => "String",
            TargetType::Guid => "Guid",
            TargetType::DateTimeOffset => "DateTimeOffset",
            TargetType::Binary => "Binary",
        }
    }
}

impl FromStr for TargetType {
    type Err = ODataError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let name = name.strip_prefix("Edm.").unwrap_or(name);
        let target = match name.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => TargetType::Boolean,
            "byte" | "u8" => TargetType::Byte,
            "int16" | "short" | "i16" => TargetType::Int16,
            "int32" | "int" | "i32" => TargetType::Int32,
            "int64" | "long" | "i64" => TargetType::Int64,
            "single" | "float" | "f32" => TargetType::Single,
            "double" | "f64" => TargetType::Double,
            "decimal" => TargetType::Decimal,
            "string" => TargetType::String,
            "guid" => TargetType::Guid,
            "datetimeoffset" | "datetime" => TargetType::DateTimeOffset,
            "binary" => TargetType::Binary,
            _ => return Err(ODataError::Syntax(format!("Unknown conversion type: {}", s))),
        };
        Ok(target)
    }
}

/// Types that can be extracted from a response value
pub trait FromValue: Sized {
    /// Convert a non-null value into `Self`
    fn from_value(value: &Value) -> Result<Self>;
}

fn conversion_error(value: &Value, target: &'static str) -> ODataError {
    ODataError::Conversion {
        value: value.to_string(),
        target,
    }
}

macro_rules! integer_from_value {
    ($($ty:ty => $target:expr),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self> {
                    match value.convert_to($target) {
                        Some(Value::Integer(i)) => <$ty>::try_from(i)
                            .map_err(|_| conversion_error(value, $target.name())),
                        _ => Err(conversion_error(value, $target.name())),
                    }
                }
            }
        )*
    };
}

integer_from_value! {
    u8 => TargetType::Byte,
    i16 => TargetType::Int16,
    i32 => TargetType::Int32,
    i64 => TargetType::Int64,
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value.convert_to(TargetType::Double) {
            Some(Value::Float(f)) => Ok(f),
            _ => Err(conversion_error(value, "Double")),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value.convert_to(TargetType::Boolean) {
            Some(Value::Boolean(b)) => Ok(b),
            _ => Err(conversion_error(value, "Boolean")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_text()
            .ok_or_else(|| conversion_error(value, "String"))
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self> {
        match value.convert_to(TargetType::Guid) {
            Some(Value::Guid(g)) => Ok(g),
            _ => Err(conversion_error(value, "Guid")),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: &Value) -> Result<Self> {
        match value.convert_to(TargetType::DateTimeOffset) {
            Some(Value::DateTime(dt)) => Ok(dt),
            _ => Err(conversion_error(value, "DateTimeOffset")),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

/// Convert from common types to Value
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt.fixed_offset())
    }
}

impl From<Properties> for Value {
    fn from(map: Properties) -> Self {
        Value::Object(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversion() {
        let int_value: Value = 42.into();
        let bool_value: Value = true.into();
        let string_value: Value = "Hello".into();

        assert_eq!(int_value, Value::Integer(42));
        assert_eq!(bool_value, Value::Boolean(true));
        assert_eq!(string_value, Value::String("Hello".to_string()));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Float(3.5).to_string(), "3.5");
        assert_eq!(Value::String("Hello".to_string()).to_string(), "\"Hello\"");
    }

    #[test]
    fn test_convert_to_integer_rounds_and_checks_range() {
        assert_eq!(Value::Float(2.5).convert_to(TargetType::Int32), Some(Value::Integer(2)));
        assert_eq!(Value::Float(3.5).convert_to(TargetType::Int32), Some(Value::Integer(4)));
        assert_eq!(Value::from(" 17 ").convert_to(TargetType::Int64), Some(Value::Integer(17)));
        assert_eq!(Value::Integer(300).convert_to(TargetType::Byte), None);
        assert_eq!(Value::from("abc").convert_to(TargetType::Int32), None);
    }

    #[test]
    fn test_convert_to_guid_and_datetime() {
        let text = "0c8e0b1e-6a3b-4d52-9a3e-1b2f3c4d5e6f";
        let guid = Value::from(text).convert_to(TargetType::Guid);
        assert_eq!(guid, Some(Value::Guid(Uuid::parse_str(text).unwrap())));

        let dt = Value::from("2014-01-02T03:04:05").convert_to(TargetType::DateTimeOffset);
        match dt {
            Some(Value::DateTime(dt)) => assert_eq!(dt.to_rfc3339(), "2014-01-02T03:04:05+00:00"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_target_type_parsing() {
        assert_eq!("Edm.Int32".parse::<TargetType>().unwrap(), TargetType::Int32);
        assert_eq!("string".parse::<TargetType>().unwrap(), TargetType::String);
        assert!("Widget".parse::<TargetType>().is_err());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(i32::from_value(&Value::from("42")).unwrap(), 42);
        assert_eq!(String::from_value(&Value::Integer(7)).unwrap(), "7");
        assert!(bool::from_value(&Value::Float(1.5)).is_err());
        assert!(i32::from_value(&Value::Integer(i64::MAX)).is_err());
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"Name": "Chai", "Price": 18.5, "Ids": [1, 2]});
        let value = Value::from(json);
        let map = value.as_object().unwrap();
        assert_eq!(map["Name"], Value::from("Chai"));
        assert_eq!(map["Price"], Value::Float(18.5));
        assert_eq!(map["Ids"], Value::Array(vec![Value::Integer(1), Value::Integer(2)]));
    }
}
