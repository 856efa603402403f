//! The inbound request envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::ValueMap;

/// A command invocation request.
///
/// Carries routing metadata plus three loosely typed parameter groups:
/// general `args`, zero-or-more `where` filter groups (one map per search
/// criterion), and the `set` mutation payload. The validation engine
/// rewrites group values in place with their coerced forms.
///
/// # Examples
///
/// ```
/// use command_api_core::{Request, Value};
///
/// let mut request = Request::new("user.get");
/// request.arguments.insert("count".into(), Value::from("5"));
/// assert_eq!(request.command, "user.get");
///
/// let parsed: Request = serde_json::from_str(
///     r#"{"command": "user.get", "where": [{"login": "alice"}]}"#,
/// ).unwrap();
/// assert_eq!(parsed.where_.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Request identifier (for debugging); echoed into the response.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Client-side timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
    /// Session token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session: String,
    /// Name of the command to execute.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,
    /// General parameters.
    #[serde(default, rename = "args", skip_serializing_if = "ValueMap::is_empty")]
    pub arguments: ValueMap,
    /// Filter criteria, one map per search item.
    #[serde(default, rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub where_: Vec<ValueMap>,
    /// Mutation payload.
    #[serde(default, skip_serializing_if = "ValueMap::is_empty")]
    pub set: ValueMap,
}

impl Request {
    /// Creates an empty request for the named command.
    pub fn new(command: impl Into<String>) -> Self {
        Request {
            command: command.into(),
            ..Request::default()
        }
    }
}
