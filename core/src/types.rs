//! Argument type tags and the pluggable coercion registry.
//!
//! Every [`Argument`](crate::Argument) declares an [`ArgumentType`] tag. At
//! validation time the tag is resolved through a [`TypeRegistry`] to a
//! coercion function that converts the loosely typed input [`Value`] into
//! the declared type. The registry is owned by the API instance, so hosts
//! can override built-ins or add their own tags without process-global
//! state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

use crate::duration::{Duration, ParseDurationError};
use crate::value::Value;

/// Type tag for a declared argument.
///
/// Built-in tags have dedicated coercion rules; [`ArgumentType::Object`] and
/// [`ArgumentType::Array`] are documentation-only tags used by the
/// request/response format catalogs and have no registered coercion.
/// [`ArgumentType::Other`] carries host-defined tags.
///
/// # Examples
///
/// ```
/// use command_api_core::ArgumentType;
///
/// assert_eq!(ArgumentType::Boolean.as_str(), "boolean");
/// assert_eq!(ArgumentType::from("geo_point"), ArgumentType::Other("geo_point".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgumentType {
    /// Boolean flag value.
    Boolean,
    /// Signed integer value.
    Integer,
    /// Floating point value.
    Float,
    /// Text value.
    String,
    /// Time span in composite segment syntax.
    Duration,
    /// UUID value.
    Uuid,
    /// RFC3339 timestamp.
    DateTime,
    /// One-level object (documentation-only).
    Object,
    /// Array of one-level objects (documentation-only).
    Array,
    /// Host-defined tag.
    Other(String),
}

impl ArgumentType {
    /// The wire spelling of this tag.
    pub fn as_str(&self) -> &str {
        match self {
            ArgumentType::Boolean => "boolean",
            ArgumentType::Integer => "integer",
            ArgumentType::Float => "float",
            ArgumentType::String => "string",
            ArgumentType::Duration => "duration",
            ArgumentType::Uuid => "uuid",
            ArgumentType::DateTime => "datetime",
            ArgumentType::Object => "object",
            ArgumentType::Array => "array",
            ArgumentType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ArgumentType {
    fn from(tag: &str) -> Self {
        match tag {
            "boolean" => ArgumentType::Boolean,
            "integer" => ArgumentType::Integer,
            "float" => ArgumentType::Float,
            "string" => ArgumentType::String,
            "duration" => ArgumentType::Duration,
            "uuid" => ArgumentType::Uuid,
            "datetime" => ArgumentType::DateTime,
            "object" => ArgumentType::Object,
            "array" => ArgumentType::Array,
            other => ArgumentType::Other(other.to_string()),
        }
    }
}

impl From<String> for ArgumentType {
    fn from(tag: String) -> Self {
        ArgumentType::from(tag.as_str())
    }
}

impl Serialize for ArgumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ArgumentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(ArgumentType::from(String::deserialize(deserializer)?))
    }
}

/// Coercion failures.
///
/// [`CoerceError::Unregistered`] and [`CoerceError::NilParser`] come from
/// the registry itself; the rest come from individual coercion rules.
#[derive(Debug, Error)]
pub enum CoerceError {
    /// The tag has no registry entry at all.
    #[error("incompatible type: {tag}")]
    Unregistered {
        /// The unresolved tag.
        tag: ArgumentType,
    },
    /// The tag was explicitly registered without a coercion function.
    #[error("nil parser: {tag}")]
    NilParser {
        /// The disabled tag.
        tag: ArgumentType,
    },
    /// The input's runtime type has no rule for the target type.
    #[error("incompatible {expected} type: {found}")]
    Incompatible {
        /// Target type name.
        expected: &'static str,
        /// Runtime type and rendering of the rejected input.
        found: String,
    },
    /// List mode received a non-list input.
    #[error("incompatible {expected} list type: {found}")]
    IncompatibleList {
        /// Target type name.
        expected: &'static str,
        /// Runtime type and rendering of the rejected input.
        found: String,
    },
    /// List mode received an explicit null.
    #[error("list can not be nil")]
    NilList,
    /// Text did not parse as an integer of the supported size.
    #[error("invalid integer {value:?}: {source}")]
    InvalidInteger {
        /// Rejected text.
        value: String,
        /// Parser failure.
        source: std::num::ParseIntError,
    },
    /// Text did not parse as a float.
    #[error("invalid float {value:?}: {source}")]
    InvalidFloat {
        /// Rejected text.
        value: String,
        /// Parser failure.
        source: std::num::ParseFloatError,
    },
    /// Text did not parse as a duration.
    #[error("invalid duration {value:?}: {source}")]
    InvalidDuration {
        /// Rejected text.
        value: String,
        /// Parser failure.
        source: ParseDurationError,
    },
    /// Text did not parse as a UUID.
    #[error("invalid uuid {value:?}: {source}")]
    InvalidUuid {
        /// Rejected text.
        value: String,
        /// Parser failure.
        source: uuid::Error,
    },
    /// Text did not parse as an RFC3339 timestamp.
    #[error("invalid datetime {value:?}: {source}")]
    InvalidDateTime {
        /// Rejected text.
        value: String,
        /// Parser failure.
        source: chrono::ParseError,
    },
    /// Failure reported by a host-registered coercion.
    #[error("{0}")]
    Custom(String),
}

/// A coercion function: converts an input value, optionally in list mode.
pub type CoerceFn = Arc<dyn Fn(&Value, bool) -> Result<Value, CoerceError> + Send + Sync>;

/// Maps type tags to coercion functions.
///
/// `register` overwrites anything, built-ins included; registering `None`
/// marks a tag as no longer usable, which is distinct from the tag being
/// absent entirely (see [`TypeRegistry::coerce`]).
///
/// # Examples
///
/// ```
/// use command_api_core::{ArgumentType, TypeRegistry, Value};
///
/// let registry = TypeRegistry::default();
/// let coerced = registry.coerce(&ArgumentType::Integer, &Value::from("10"), false).unwrap();
/// assert_eq!(coerced, Value::Integer(10));
/// ```
pub struct TypeRegistry {
    parsers: HashMap<ArgumentType, Option<CoerceFn>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = TypeRegistry::empty();
        let builtins: [(ArgumentType, fn(&Value, bool) -> Result<Value, CoerceError>); 7] = [
            (ArgumentType::Boolean, coerce_boolean),
            (ArgumentType::Integer, coerce_integer),
            (ArgumentType::Float, coerce_float),
            (ArgumentType::String, coerce_string),
            (ArgumentType::Duration, coerce_duration),
            (ArgumentType::Uuid, coerce_uuid),
            (ArgumentType::DateTime, coerce_datetime),
        ];
        for (tag, parser) in builtins {
            registry.register(tag, Some(Arc::new(parser)));
        }
        registry
    }
}

impl TypeRegistry {
    /// Creates a registry with no entries at all.
    pub fn empty() -> Self {
        TypeRegistry {
            parsers: HashMap::new(),
        }
    }

    /// Registers (or overwrites) the coercion for a tag. `None` marks the
    /// tag as registered but unusable.
    pub fn register(&mut self, tag: ArgumentType, parser: Option<CoerceFn>) {
        self.parsers.insert(tag, parser);
    }

    /// Returns the usable coercion function for a tag, if any.
    pub fn resolve(&self, tag: &ArgumentType) -> Option<CoerceFn> {
        self.parsers.get(tag).and_then(Clone::clone)
    }

    /// Whether the tag has a registry entry (usable or not).
    pub fn contains(&self, tag: &ArgumentType) -> bool {
        self.parsers.contains_key(tag)
    }

    /// Coerces `value` to the type named by `tag`.
    ///
    /// In list mode the scalar rule is applied to every element of a
    /// [`Value::List`]; a null list is rejected outright and the first
    /// failing element fails the whole coercion.
    pub fn coerce(&self, tag: &ArgumentType, value: &Value, list: bool) -> Result<Value, CoerceError> {
        match self.parsers.get(tag) {
            None => Err(CoerceError::Unregistered { tag: tag.clone() }),
            Some(None) => Err(CoerceError::NilParser { tag: tag.clone() }),
            Some(Some(parser)) => parser(value, list),
        }
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&ArgumentType> = self.parsers.keys().collect();
        tags.sort_by_key(|tag| tag.as_str().to_string());
        f.debug_struct("TypeRegistry").field("tags", &tags).finish()
    }
}

/// Runtime type plus rendering, for rejection messages.
fn describe(value: &Value) -> String {
    format!("{} ({value})", value.kind())
}

/// Applies a scalar rule across a list input.
fn coerce_list(
    value: &Value,
    expected: &'static str,
    scalar: fn(&Value) -> Result<Value, CoerceError>,
) -> Result<Value, CoerceError> {
    match value {
        Value::Null => Err(CoerceError::NilList),
        Value::List(items) => items
            .iter()
            .map(scalar)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Err(CoerceError::IncompatibleList {
            expected,
            found: describe(other),
        }),
    }
}

fn boolean_scalar(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Bool(v) => Ok(Value::Bool(*v)),
        Value::Integer(v) => Ok(Value::Bool(*v != 0)),
        Value::Float(v) => Ok(Value::Bool(*v != 0.0)),
        // Only the exact literal "true" is truthy; any other text is false.
        Value::String(v) => Ok(Value::Bool(v == "true")),
        other => Err(CoerceError::Incompatible {
            expected: "boolean",
            found: describe(other),
        }),
    }
}

fn coerce_boolean(value: &Value, list: bool) -> Result<Value, CoerceError> {
    if list {
        return coerce_list(value, "boolean", boolean_scalar);
    }
    boolean_scalar(value)
}

fn integer_scalar(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Bool(v) => Ok(Value::Integer(i64::from(*v))),
        Value::Integer(v) => Ok(Value::Integer(*v)),
        Value::Float(v) => Ok(Value::Integer(*v as i64)),
        // Text is parsed at 8-bit width; larger magnitudes are rejected.
        Value::String(v) => match v.parse::<i8>() {
            Ok(n) => Ok(Value::Integer(i64::from(n))),
            Err(source) => Err(CoerceError::InvalidInteger {
                value: v.clone(),
                source,
            }),
        },
        other => Err(CoerceError::Incompatible {
            expected: "integer",
            found: describe(other),
        }),
    }
}

fn coerce_integer(value: &Value, list: bool) -> Result<Value, CoerceError> {
    if list {
        return coerce_list(value, "integer", integer_scalar);
    }
    integer_scalar(value)
}

fn float_scalar(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Bool(v) => Ok(Value::Float(if *v { 1.0 } else { 0.0 })),
        Value::Integer(v) => Ok(Value::Float(*v as f64)),
        Value::Float(v) => Ok(Value::Float(*v)),
        Value::String(v) => match v.parse::<f64>() {
            Ok(n) => Ok(Value::Float(n)),
            Err(source) => Err(CoerceError::InvalidFloat {
                value: v.clone(),
                source,
            }),
        },
        other => Err(CoerceError::Incompatible {
            expected: "float",
            found: describe(other),
        }),
    }
}

fn coerce_float(value: &Value, list: bool) -> Result<Value, CoerceError> {
    if list {
        return coerce_list(value, "float", float_scalar);
    }
    float_scalar(value)
}

fn string_scalar(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Bool(v) => Ok(Value::String(v.to_string())),
        Value::Integer(v) => Ok(Value::String(v.to_string())),
        Value::Float(v) => Ok(Value::String(if *v == 0.0 {
            "0.0".to_string()
        } else {
            v.to_string()
        })),
        Value::String(v) => Ok(Value::String(v.clone())),
        other => Err(CoerceError::Incompatible {
            expected: "string",
            found: describe(other),
        }),
    }
}

fn coerce_string(value: &Value, list: bool) -> Result<Value, CoerceError> {
    if list {
        return coerce_list(value, "string", string_scalar);
    }
    string_scalar(value)
}

fn duration_scalar(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Duration(v) => Ok(Value::Duration(*v)),
        // Bare integers count nanoseconds.
        Value::Integer(v) => Ok(Value::Duration(Duration::from_nanos(*v))),
        Value::String(v) => match v.parse::<Duration>() {
            Ok(d) => Ok(Value::Duration(d)),
            Err(source) => Err(CoerceError::InvalidDuration {
                value: v.clone(),
                source,
            }),
        },
        other => Err(CoerceError::Incompatible {
            expected: "duration",
            found: describe(other),
        }),
    }
}

fn coerce_duration(value: &Value, list: bool) -> Result<Value, CoerceError> {
    if list {
        return coerce_list(value, "duration", duration_scalar);
    }
    duration_scalar(value)
}

fn uuid_scalar(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::Uuid(v) => Ok(Value::Uuid(*v)),
        Value::String(v) => match Uuid::parse_str(v) {
            Ok(u) => Ok(Value::Uuid(u)),
            Err(source) => Err(CoerceError::InvalidUuid {
                value: v.clone(),
                source,
            }),
        },
        other => Err(CoerceError::Incompatible {
            expected: "uuid",
            found: describe(other),
        }),
    }
}

fn coerce_uuid(value: &Value, list: bool) -> Result<Value, CoerceError> {
    if list {
        return coerce_list(value, "uuid", uuid_scalar);
    }
    uuid_scalar(value)
}

fn datetime_scalar(value: &Value) -> Result<Value, CoerceError> {
    match value {
        Value::DateTime(v) => Ok(Value::DateTime(*v)),
        Value::String(v) => match DateTime::parse_from_rfc3339(v) {
            Ok(t) => Ok(Value::DateTime(t.with_timezone(&Utc))),
            Err(source) => Err(CoerceError::InvalidDateTime {
                value: v.clone(),
                source,
            }),
        },
        other => Err(CoerceError::Incompatible {
            expected: "datetime",
            found: describe(other),
        }),
    }
}

fn coerce_datetime(value: &Value, list: bool) -> Result<Value, CoerceError> {
    if list {
        return coerce_list(value, "datetime", datetime_scalar);
    }
    datetime_scalar(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts(tag: ArgumentType, cases: &[(Value, Value)]) {
        let registry = TypeRegistry::default();
        for (input, want) in cases {
            let got = registry
                .coerce(&tag, input, false)
                .unwrap_or_else(|err| panic!("{tag}: input {input:?} rejected: {err}"));
            assert_eq!(&got, want, "{tag}: input {input:?}");
        }
    }

    fn rejects(tag: ArgumentType, cases: &[Value]) {
        let registry = TypeRegistry::default();
        for input in cases {
            assert!(
                registry.coerce(&tag, input, false).is_err(),
                "{tag}: input {input:?} unexpectedly accepted",
            );
        }
    }

    #[test]
    fn test_boolean_coercions() {
        accepts(
            ArgumentType::Boolean,
            &[
                (Value::Bool(false), Value::Bool(false)),
                (Value::Bool(true), Value::Bool(true)),
                (Value::Integer(0), Value::Bool(false)),
                (Value::Integer(1), Value::Bool(true)),
                (Value::Integer(-1), Value::Bool(true)),
                (Value::Float(15.2), Value::Bool(true)),
                (Value::from("true"), Value::Bool(true)),
                (Value::from("false"), Value::Bool(false)),
                (Value::from("foo"), Value::Bool(false)),
                (Value::from("-5.8"), Value::Bool(false)),
            ],
        );
        rejects(ArgumentType::Boolean, &[Value::Null]);
    }

    #[test]
    fn test_integer_coercions() {
        accepts(
            ArgumentType::Integer,
            &[
                (Value::Bool(false), Value::Integer(0)),
                (Value::Bool(true), Value::Integer(1)),
                (Value::Integer(-8), Value::Integer(-8)),
                (Value::Float(15.2), Value::Integer(15)),
                (Value::Float(-15.2), Value::Integer(-15)),
                (Value::from("10"), Value::Integer(10)),
                (Value::from("-128"), Value::Integer(-128)),
            ],
        );
        rejects(
            ArgumentType::Integer,
            &[
                Value::Null,
                Value::from("-5.8"),
                Value::from("false"),
                Value::from("foo"),
                Value::from("2s"),
                // Eight-bit text parsing rejects larger magnitudes.
                Value::from("128"),
                Value::from("1000"),
            ],
        );
    }

    #[test]
    fn test_float_coercions() {
        accepts(
            ArgumentType::Float,
            &[
                (Value::Bool(false), Value::Float(0.0)),
                (Value::Bool(true), Value::Float(1.0)),
                (Value::Integer(-8), Value::Float(-8.0)),
                (Value::Float(15.2), Value::Float(15.2)),
                (Value::from("-5.8"), Value::Float(-5.8)),
                (Value::from("1000.25"), Value::Float(1000.25)),
            ],
        );
        rejects(
            ArgumentType::Float,
            &[
                Value::Null,
                Value::from("false"),
                Value::from("foo"),
                Value::from("1.5h25s"),
            ],
        );
    }

    #[test]
    fn test_string_coercions() {
        accepts(
            ArgumentType::String,
            &[
                (Value::Bool(false), Value::from("false")),
                (Value::Bool(true), Value::from("true")),
                (Value::Integer(0), Value::from("0")),
                (Value::Integer(-1), Value::from("-1")),
                (Value::Float(0.0), Value::from("0.0")),
                (Value::Float(15.2), Value::from("15.2")),
                (Value::from("foo"), Value::from("foo")),
            ],
        );
        rejects(ArgumentType::String, &[Value::Null]);
    }

    #[test]
    fn test_duration_coercions() {
        accepts(
            ArgumentType::Duration,
            &[
                (Value::Integer(0), Value::Duration(Duration::from_nanos(0))),
                (Value::Integer(1), Value::Duration(Duration::NANOSECOND)),
                (Value::Integer(-8), Value::Duration(Duration::NANOSECOND * -8)),
                (Value::from("2s"), Value::Duration(Duration::SECOND * 2)),
                (
                    Value::from("1.5h25s"),
                    Value::Duration(Duration::HOUR + Duration::MINUTE * 30 + Duration::SECOND * 25),
                ),
                (
                    Value::from("-15m8s"),
                    Value::Duration(-(Duration::MINUTE * 15 + Duration::SECOND * 8)),
                ),
                (
                    Value::Duration(Duration::MINUTE * 15),
                    Value::Duration(Duration::MINUTE * 15),
                ),
            ],
        );
        rejects(
            ArgumentType::Duration,
            &[
                Value::Null,
                Value::Bool(true),
                Value::Bool(false),
                Value::Float(15.2),
                Value::from("-5.8"),
                Value::from("foo"),
                Value::from("true"),
            ],
        );
    }

    #[test]
    fn test_uuid_coercions() {
        let id: Uuid = "01234567-89ab-cdef-0123-456789abcdef".parse().unwrap();
        accepts(
            ArgumentType::Uuid,
            &[
                (Value::Uuid(id), Value::Uuid(id)),
                (
                    Value::from("01234567-89ab-cdef-0123-456789abcdef"),
                    Value::Uuid(id),
                ),
            ],
        );
        rejects(
            ArgumentType::Uuid,
            &[
                Value::Null,
                Value::Integer(5),
                Value::from("not-a-uuid"),
                Value::from("01234567-89ab-cdef-0123"),
            ],
        );
    }

    #[test]
    fn test_datetime_coercions() {
        let t = DateTime::parse_from_rfc3339("2018-10-16T09:58:03Z")
            .unwrap()
            .with_timezone(&Utc);
        accepts(
            ArgumentType::DateTime,
            &[
                (Value::DateTime(t), Value::DateTime(t)),
                (Value::from("2018-10-16T09:58:03Z"), Value::DateTime(t)),
            ],
        );
        rejects(
            ArgumentType::DateTime,
            &[Value::Null, Value::Integer(5), Value::from("yesterday")],
        );
    }

    #[test]
    fn test_list_mode() {
        let registry = TypeRegistry::default();
        let input = Value::List(vec![Value::Bool(false), Value::Bool(true)]);
        assert_eq!(
            registry
                .coerce(&ArgumentType::Boolean, &input, true)
                .unwrap(),
            input,
        );

        // Elements run through the scalar rule.
        let mixed = Value::List(vec![Value::from("5"), Value::Integer(7)]);
        assert_eq!(
            registry.coerce(&ArgumentType::Integer, &mixed, true).unwrap(),
            Value::List(vec![Value::Integer(5), Value::Integer(7)]),
        );

        // A failing element fails the whole list.
        let bad = Value::List(vec![Value::from("5"), Value::from("foo")]);
        assert!(registry.coerce(&ArgumentType::Integer, &bad, true).is_err());
    }

    #[test]
    fn test_nil_list_rejected_for_every_builtin() {
        let registry = TypeRegistry::default();
        for tag in [
            ArgumentType::Boolean,
            ArgumentType::Integer,
            ArgumentType::Float,
            ArgumentType::String,
            ArgumentType::Duration,
            ArgumentType::Uuid,
            ArgumentType::DateTime,
        ] {
            assert!(
                registry.coerce(&tag, &Value::Null, true).is_err(),
                "{tag}: nil list accepted",
            );
        }
    }

    #[test]
    fn test_unregistered_and_nil_parser() {
        let mut registry = TypeRegistry::default();
        let unknown = ArgumentType::from("incompatible_type");
        assert!(matches!(
            registry.coerce(&unknown, &Value::Null, false),
            Err(CoerceError::Unregistered { .. }),
        ));

        let disabled = ArgumentType::from("nil_parser");
        registry.register(disabled.clone(), None);
        assert!(matches!(
            registry.coerce(&disabled, &Value::Null, false),
            Err(CoerceError::NilParser { .. }),
        ));
    }

    #[test]
    fn test_register_overrides_builtin() {
        let mut registry = TypeRegistry::default();
        registry.register(
            ArgumentType::Boolean,
            Some(Arc::new(|_: &Value, _: bool| Ok(Value::Bool(true)))),
        );
        assert_eq!(
            registry
                .coerce(&ArgumentType::Boolean, &Value::from("anything"), false)
                .unwrap(),
            Value::Bool(true),
        );
    }
}
