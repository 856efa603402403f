//! Typed wire errors and the process error catalog.
//!
//! Request-time failures are [`ApiError`]s: a stable integer code, a
//! catalog-backed description, and an optional internal cause that is never
//! serialized but stays available to host logging through
//! [`std::error::Error::source`]. Hosts extend the catalog with their own
//! codes starting at [`LAST_USED_ERROR_CODE`].

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Catch-all for pipeline or handler errors that are not already typed.
pub const ERR_UNKNOWN: i32 = 1;
/// No request object was supplied.
pub const ERR_INVALID_REQUEST: i32 = 2;
/// The request names a command that is missing or invalid.
pub const ERR_UNKNOWN_COMMAND: i32 = 3;
/// A declared argument pattern failed to compile.
pub const ERR_INVALID_ARGUMENT_REGEXP: i32 = 4;
/// A coerced value did not match its declared pattern.
pub const ERR_ARGUMENT_REGEXP_MATCH_FAILS: i32 = 5;
/// A required argument is absent from its group.
pub const ERR_REQUIRED_ARGUMENT_MISSING: i32 = 6;
/// The request supplies an argument name that is not declared.
pub const ERR_UNKNOWN_ARGUMENT: i32 = 7;
/// A value is null without `nullable`, or fails type coercion.
pub const ERR_INVALID_ARGUMENT_VALUE: i32 = 8;
/// First code available for host-defined errors.
pub const LAST_USED_ERROR_CODE: i32 = 100;

/// A typed request-processing error.
///
/// Equality ignores the internal cause, so catalog lookups and test
/// assertions compare code and description only.
///
/// # Examples
///
/// ```
/// use command_api_core::{ApiError, ERR_UNKNOWN_COMMAND, ErrorCatalog};
///
/// let err = ErrorCatalog::builtin().get(ERR_UNKNOWN_COMMAND);
/// assert_eq!(err.code, ERR_UNKNOWN_COMMAND);
/// assert_eq!(err.to_string(), "[3] unknown command");
///
/// let custom = ApiError::new(150, "quota exceeded").with_detail("uploads");
/// assert_eq!(custom.description, "quota exceeded: uploads");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    /// Stable integer code.
    pub code: i32,
    /// Human-readable description.
    #[serde(rename = "desc", default)]
    pub description: String,
    /// Wrapped underlying cause; never serialized.
    #[serde(skip)]
    pub internal: Option<Arc<dyn StdError + Send + Sync>>,
}

impl ApiError {
    /// Creates an error with the given code and description.
    pub fn new(code: i32, description: impl Into<String>) -> Self {
        ApiError {
            code,
            description: description.into(),
            internal: None,
        }
    }

    /// Appends a detail to the description (`"description: detail"`).
    pub fn with_detail(mut self, detail: impl fmt::Display) -> Self {
        self.description = format!("{}: {}", self.description, detail);
        self
    }

    /// Attaches an underlying cause.
    pub fn with_internal(mut self, internal: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        self.internal = Some(Arc::from(internal.into()));
        self
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.description == other.description
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.internal {
            Some(cause) => write!(f, "[{}] {} |internal| {}", self.code, self.description, cause),
            None => write!(f, "[{}] {}", self.code, self.description),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.internal
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Ordered code-to-description table.
///
/// Lookups for unregistered codes degrade to a placeholder carrying only
/// the code; they never fail. Mutations guard against configuration
/// mistakes by panicking.
///
/// # Examples
///
/// ```
/// use command_api_core::{ApiError, ErrorCatalog, LAST_USED_ERROR_CODE};
///
/// let mut catalog = ErrorCatalog::builtin();
/// catalog.add(ApiError::new(LAST_USED_ERROR_CODE + 1, "quota exceeded"));
/// assert_eq!(catalog.get(LAST_USED_ERROR_CODE + 1).description, "quota exceeded");
///
/// // Unregistered codes still produce a usable placeholder.
/// assert_eq!(catalog.get(9000).code, 9000);
/// assert!(catalog.get(9000).description.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCatalog(Vec<ApiError>);

impl ErrorCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        ErrorCatalog(Vec::new())
    }

    /// The catalog of built-in codes 1 through 8.
    pub fn builtin() -> Self {
        ErrorCatalog(vec![
            ApiError::new(ERR_UNKNOWN, "unknown error occurred"),
            ApiError::new(ERR_INVALID_REQUEST, "can't parse request"),
            ApiError::new(ERR_UNKNOWN_COMMAND, "unknown command"),
            ApiError::new(
                ERR_INVALID_ARGUMENT_REGEXP,
                "invalid command argument parameter regexp",
            ),
            ApiError::new(
                ERR_ARGUMENT_REGEXP_MATCH_FAILS,
                "match command argument parameter regexp fails",
            ),
            ApiError::new(
                ERR_REQUIRED_ARGUMENT_MISSING,
                "require command argument parameter missing",
            ),
            ApiError::new(
                ERR_UNKNOWN_ARGUMENT,
                "unknown command argument parameter in request",
            ),
            ApiError::new(
                ERR_INVALID_ARGUMENT_VALUE,
                "invalid command argument parameter value",
            ),
        ])
    }

    /// Whether the catalog has an entry for this code.
    pub fn contains(&self, code: i32) -> bool {
        self.0.iter().any(|entry| entry.code == code)
    }

    /// Registers a new entry.
    ///
    /// # Panics
    ///
    /// Panics when the code is already registered.
    pub fn add(&mut self, entry: ApiError) {
        if self.contains(entry.code) {
            panic!("duplicate error code in catalog: {}", entry.code);
        }
        self.0.push(entry);
    }

    /// Looks up an entry, degrading to a code-only placeholder when the
    /// code is unregistered.
    pub fn get(&self, code: i32) -> ApiError {
        self.0
            .iter()
            .find(|entry| entry.code == code)
            .cloned()
            .unwrap_or_else(|| ApiError::new(code, ""))
    }

    /// Removes an entry.
    ///
    /// # Panics
    ///
    /// Panics when the code is not registered.
    pub fn remove(&mut self, code: i32) -> ApiError {
        let Some(idx) = self.0.iter().position(|entry| entry.code == code) else {
            panic!("unknown error code in catalog: {code}");
        };
        self.0.remove(idx)
    }

    /// Iterates entries in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ApiError> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_texts() {
        let catalog = ErrorCatalog::builtin();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.get(ERR_UNKNOWN).description, "unknown error occurred");
        assert_eq!(catalog.get(ERR_UNKNOWN_COMMAND).description, "unknown command");
    }

    #[test]
    fn test_get_degrades_to_placeholder() {
        let catalog = ErrorCatalog::builtin();
        let placeholder = catalog.get(424242);
        assert_eq!(placeholder.code, 424242);
        assert!(placeholder.description.is_empty());
    }

    #[test]
    #[should_panic(expected = "duplicate error code in catalog: 1")]
    fn test_duplicate_add_panics() {
        let mut catalog = ErrorCatalog::builtin();
        catalog.add(ApiError::new(ERR_UNKNOWN, "again"));
    }

    #[test]
    #[should_panic(expected = "unknown error code in catalog: 4242")]
    fn test_remove_unknown_panics() {
        let mut catalog = ErrorCatalog::builtin();
        catalog.remove(4242);
    }

    #[test]
    fn test_internal_cause_never_serializes() {
        let err = ApiError::new(ERR_UNKNOWN, "unknown error occurred")
            .with_internal(std::io::Error::other("disk on fire"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"code": 1, "desc": "unknown error occurred"}));

        // Still reachable for logging.
        use std::error::Error as _;
        assert_eq!(err.source().unwrap().to_string(), "disk on fire");
        assert!(err.to_string().contains("|internal| disk on fire"));
    }
}
