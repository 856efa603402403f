//! The outbound response envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::Request;
use crate::value::ValueMap;

/// A command execution response.
///
/// Handlers mutate the response through the per-request context; after the
/// handler (or any failure) the dispatcher reconciles routing metadata from
/// the request via [`Response::fill_missing_from`].
///
/// [`Response::new`] seeds a zero-code placeholder error so a handler can
/// fill fields into an existing error object; reconciliation clears the
/// placeholder, which makes "no error" serialize as an absent field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Echo of the request identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Server-side timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
    /// Echo of the session token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session: String,
    /// Echo of the executed command name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,
    /// Echo of general parameters, when a handler chooses to set them.
    #[serde(default, rename = "args", skip_serializing_if = "ValueMap::is_empty")]
    pub arguments: ValueMap,
    /// Opaque result payload set by the handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Typed error, absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    /// Creates a response with the zero-code placeholder error.
    pub fn new() -> Self {
        Response {
            error: Some(ApiError::default()),
            ..Response::default()
        }
    }

    /// Reconciles response metadata from the request: copies the id when
    /// the request carries one, stamps the current UTC time when the
    /// request carried a timestamp and the response does not, copies
    /// command and session when absent, and clears a zero-code placeholder
    /// error.
    pub fn fill_missing_from(&mut self, request: &Request) {
        if !request.id.is_empty() {
            self.id = request.id.clone();
        }
        if request.datetime.is_some() && self.datetime.is_none() {
            self.datetime = Some(Utc::now());
        }
        if self.command.is_empty() {
            self.command = request.command.clone();
        }
        if self.session.is_empty() {
            self.session = request.session.clone();
        }
        if self.error.as_ref().is_some_and(|err| err.code == 0) {
            self.error = None;
        }
    }
}
