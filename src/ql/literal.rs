//! Protocol spelling of literal values

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::{DateTime, FixedOffset};

use crate::errors::{ODataError, Result};
use crate::session::ProtocolVersion;
use crate::value::Value;

/// Converts values into protocol literal text
pub trait LiteralFormatter: Send + Sync {
    /// Format `value`; `for_array` selects the JSON-like spelling used
    /// inside collection literals
    fn format_literal(&self, value: &Value, for_array: bool) -> Result<String>;

    /// Format a (qualified) type name as used by `isof`/`cast`
    fn format_type_name(&self, qualified_name: &str) -> String;
}

/// Literal spelling of the OData URL conventions
#[derive(Debug, Clone, Copy)]
pub struct ODataLiteralFormatter {
    version: ProtocolVersion,
}

impl ODataLiteralFormatter {
    pub const fn new(version: ProtocolVersion) -> Self {
        ODataLiteralFormatter { version }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    fn format_string(&self, text: &str, for_array: bool) -> String {
        if for_array {
            serde_json::Value::String(text.to_string()).to_string()
        } else {
            format!("'{}'", text.replace('\'', "''"))
        }
    }

    fn format_datetime(&self, dt: &DateTime<FixedOffset>) -> String {
        match self.version {
            ProtocolVersion::V4 => dt.to_rfc3339(),
            ProtocolVersion::V3 if dt.offset().local_minus_utc() == 0 => {
                format!("datetime'{}'", dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f"))
            }
            ProtocolVersion::V3 => format!("datetimeoffset'{}'", dt.to_rfc3339()),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF".to_string() } else { "-INF".to_string() };
    }
    let text = f.to_string();
    if text.contains(&['.', 'e', 'E'][..]) {
        text
    } else {
        format!("{}.0", text)
    }
}

impl LiteralFormatter for ODataLiteralFormatter {
    fn format_literal(&self, value: &Value, for_array: bool) -> Result<String> {
        let text = match value {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => {
                let out_of_int32 = *i > i32::MAX as i64 || *i < i32::MIN as i64;
                if self.version == ProtocolVersion::V3 && out_of_int32 && !for_array {
                    format!("{}L", i)
                } else {
                    i.to_string()
                }
            }
            Value::Float(f) => format_float(*f),
            Value::String(s) => self.format_string(s, for_array),
            Value::Binary(data) => match self.version {
                ProtocolVersion::V3 => {
                    let hex: String = data.iter().map(|b| format!("{:02X}", b)).collect();
                    format!("X'{}'", hex)
                }
                ProtocolVersion::V4 => format!("binary'{}'", URL_SAFE.encode(data)),
            },
            Value::Guid(g) => match self.version {
                ProtocolVersion::V3 => format!("guid'{}'", g),
                ProtocolVersion::V4 => g.to_string(),
            },
            Value::DateTime(dt) => {
                let text = self.format_datetime(dt);
                if for_array {
                    serde_json::Value::String(dt.to_rfc3339()).to_string()
                } else {
                    text
                }
            }
            Value::Enum { type_name, member } => match self.version {
                ProtocolVersion::V3 => self.format_string(member, for_array),
                ProtocolVersion::V4 if for_array => self.format_string(member, true),
                ProtocolVersion::V4 => format!("{}'{}'", type_name, member),
            },
            Value::Array(items) => {
                let parts = items
                    .iter()
                    .map(|item| self.format_literal(item, true))
                    .collect::<Result<Vec<_>>>()?;
                format!("[{}]", parts.join(","))
            }
            Value::Object(_) => {
                return Err(ODataError::UnsupportedLiteral(format!(
                    "{} values have no literal form",
                    value.type_name()
                )))
            }
        };
        Ok(text)
    }

    fn format_type_name(&self, qualified_name: &str) -> String {
        match self.version {
            ProtocolVersion::V3 => format!("'{}'", qualified_name),
            ProtocolVersion::V4 => qualified_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn v3() -> ODataLiteralFormatter {
        ODataLiteralFormatter::new(ProtocolVersion::V3)
    }

    fn v4() -> ODataLiteralFormatter {
        ODataLiteralFormatter::new(ProtocolVersion::V4)
    }

    #[test]
    fn test_strings_escape_quotes() {
        let value = Value::from("O'Neil");
        assert_eq!(v4().format_literal(&value, false).unwrap(), "'O''Neil'");
        assert_eq!(v4().format_literal(&value, true).unwrap(), "\"O'Neil\"");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(v4().format_literal(&Value::Integer(42), false).unwrap(), "42");
        assert_eq!(v3().format_literal(&Value::Integer(5_000_000_000), false).unwrap(), "5000000000L");
        assert_eq!(v4().format_literal(&Value::Integer(5_000_000_000), false).unwrap(), "5000000000");
        assert_eq!(v4().format_literal(&Value::Float(2.0), false).unwrap(), "2.0");
        assert_eq!(v4().format_literal(&Value::Float(2.5), false).unwrap(), "2.5");
    }

    #[test]
    fn test_guid_per_version() {
        let id = Uuid::nil();
        assert_eq!(
            v3().format_literal(&Value::Guid(id), false).unwrap(),
            "guid'00000000-0000-0000-0000-000000000000'"
        );
        assert_eq!(
            v4().format_literal(&Value::Guid(id), false).unwrap(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_datetime_per_version() {
        let dt = DateTime::parse_from_rfc3339("2024-03-01T10:30:00+00:00").unwrap();
        assert_eq!(
            v3().format_literal(&Value::DateTime(dt), false).unwrap(),
            "datetime'2024-03-01T10:30:00'"
        );
        assert_eq!(
            v4().format_literal(&Value::DateTime(dt), false).unwrap(),
            "2024-03-01T10:30:00+00:00"
        );

        let shifted = DateTime::parse_from_rfc3339("2024-03-01T10:30:00+02:00").unwrap();
        assert_eq!(
            v3().format_literal(&Value::DateTime(shifted), false).unwrap(),
            "datetimeoffset'2024-03-01T10:30:00+02:00'"
        );
    }

    #[test]
    fn test_enum_and_binary() {
        let color = Value::Enum {
            type_name: "NorthwindModel.Color".to_string(),
            member: "Red".to_string(),
        };
        assert_eq!(v4().format_literal(&color, false).unwrap(), "NorthwindModel.Color'Red'");
        assert_eq!(v3().format_literal(&color, false).unwrap(), "'Red'");

        let data = Value::Binary(vec![0xAB, 0x01]);
        assert_eq!(v3().format_literal(&data, false).unwrap(), "X'AB01'");
        assert_eq!(v4().format_literal(&data, false).unwrap(), "binary'qwE='");
    }

    #[test]
    fn test_arrays_and_objects() {
        let items = Value::Array(vec![Value::from("a"), Value::Integer(1)]);
        assert_eq!(v4().format_literal(&items, false).unwrap(), "[\"a\",1]");

        let object = Value::Object(Default::default());
        assert!(matches!(
            v4().format_literal(&object, false),
            Err(ODataError::UnsupportedLiteral(_))
        ));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(v3().format_type_name("NS.Employee"), "'NS.Employee'");
        assert_eq!(v4().format_type_name("NS.Employee"), "NS.Employee");
    }
}
