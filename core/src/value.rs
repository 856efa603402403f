//! Dynamically typed parameter values.
//!
//! Request parameter groups arrive as loosely typed data: deserialization
//! only ever produces the untyped variants ([`Value::Null`], [`Value::Bool`],
//! [`Value::Integer`], [`Value::Float`], [`Value::String`], [`Value::List`],
//! [`Value::Object`]). The typed variants ([`Value::Duration`],
//! [`Value::Uuid`], [`Value::DateTime`]) appear only as coercion output and
//! serialize back to their canonical string forms, so coerced values
//! round-trip through the wire layer untouched.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::duration::Duration;

/// An ordered name-to-value mapping, the shape of every parameter group.
pub type ValueMap = BTreeMap<String, Value>;

/// A dynamically typed parameter value.
///
/// # Examples
///
/// ```
/// use command_api_core::Value;
///
/// let v: Value = serde_json::from_str("42").unwrap();
/// assert_eq!(v, Value::Integer(42));
/// assert_eq!(v.to_string(), "42");
///
/// let list: Value = serde_json::from_str(r#"[true, "x"]"#).unwrap();
/// assert_eq!(list, Value::List(vec![Value::Bool(true), Value::from("x")]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 text.
    String(String),
    /// A coerced duration (serializes as segment syntax).
    Duration(Duration),
    /// A coerced UUID (serializes as canonical hyphenated text).
    Uuid(Uuid),
    /// A coerced timestamp (serializes as RFC3339).
    DateTime(DateTime<Utc>),
    /// Homogeneous or mixed sequence.
    List(Vec<Value>),
    /// One-level nested object.
    Object(ValueMap),
}

impl Value {
    /// Short name of the runtime type, used in coercion error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Duration(_) => "duration",
            Value::Uuid(_) => "uuid",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the object payload, if any.
    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Value::Object(v) => Some(v),
            _ => None,
        }
    }
}

/// Bare stringification, the form regex constraints match against. Numbers
/// render plainly, strings render without quotes.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Duration(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::DateTime(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (idx, (name, value)) in map.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{name}:{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<ValueMap> for Value {
    fn from(v: ValueMap) -> Self {
        Value::Object(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Integer(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::Duration(v) => serializer.serialize_str(&v.to_string()),
            Value::Uuid(v) => serializer.serialize_str(&v.to_string()),
            Value::DateTime(v) => {
                serializer.serialize_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::List(v) => v.serialize(serializer),
            Value::Object(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("any parameter value")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Integer(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
                Ok(match i64::try_from(v) {
                    Ok(n) => Value::Integer(n),
                    Err(_) => Value::Float(v as f64),
                })
            }

            fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Float(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Value, E> {
                Ok(Value::String(v.to_string()))
            }

            fn visit_string<E>(self, v: String) -> Result<Value, E> {
                Ok(Value::String(v))
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
                Value::deserialize(deserializer)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::List(items))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
                let mut entries = ValueMap::new();
                while let Some((name, value)) = map.next_entry::<String, Value>()? {
                    entries.insert(name, value);
                }
                Ok(Value::Object(entries))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_produces_untyped_variants() {
        let v: Value = serde_json::from_str(r#"{"a": [1, 2.5, "x", null, true]}"#).unwrap();
        let Value::Object(map) = v else {
            panic!("expected object");
        };
        assert_eq!(
            map["a"],
            Value::List(vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Null,
                Value::Bool(true),
            ]),
        );
    }

    #[test]
    fn test_typed_variants_serialize_as_canonical_strings() {
        let d = Value::Duration("1h30m".parse().unwrap());
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"1h30m0s\"");

        let u = Value::Uuid("01234567-89ab-cdef-0123-456789abcdef".parse().unwrap());
        assert_eq!(
            serde_json::to_string(&u).unwrap(),
            "\"01234567-89ab-cdef-0123-456789abcdef\"",
        );

        let t = chrono::DateTime::parse_from_rfc3339("2018-10-16T09:58:03Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            serde_json::to_string(&Value::DateTime(t)).unwrap(),
            "\"2018-10-16T09:58:03Z\"",
        );
    }

    #[test]
    fn test_display_is_bare() {
        assert_eq!(Value::from("xmpl").to_string(), "xmpl");
        assert_eq!(Value::Integer(10).to_string(), "10");
        assert_eq!(Value::Float(1.0).to_string(), "1");
        assert_eq!(Value::Float(10.01).to_string(), "10.01");
        assert_eq!(
            Value::List(vec![Value::Integer(1), Value::Integer(2)]).to_string(),
            "[1 2]",
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let v = Value::Object(ValueMap::from([
            ("count".to_string(), Value::Integer(5)),
            ("login".to_string(), Value::from("alice")),
        ]));
        let yaml = serde_yaml::to_string(&v).unwrap();
        let back: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, v);
    }
}
