//! Stock argument schemas for common API surfaces.
//!
//! Hosts assembling user-facing commands tend to redeclare the same handful
//! of parameters; these constructors return ready-made [`Argument`]s that
//! can be further adjusted with the builder methods
//! (`presets::count().required()`).

use crate::argument::Argument;
use crate::types::ArgumentType;

/// Pattern for canonical hyphenated UUID text.
pub const REGEXP_UUID: &str = "^[0-9a-f]{8}(-[0-9a-f]{4}){3}-[0-9a-f]{12}$";
/// Pattern for a plain unsigned decimal integer.
pub const REGEXP_INTEGER: &str = "^[0-9]+$";
/// Pattern for an RFC5322-ish email address.
pub const REGEXP_EMAIL: &str = "^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

/// Integer identifier.
pub fn id() -> Argument {
    Argument::new("id", ArgumentType::Integer)
        .with_description("Identifier")
        .with_regexp(REGEXP_INTEGER)
}

/// UUID identifier.
pub fn uuid_id() -> Argument {
    Argument::new("id", ArgumentType::Uuid)
        .with_description("Identifier")
        .with_regexp(REGEXP_UUID)
}

/// Login string.
pub fn login() -> Argument {
    Argument::new("login", ArgumentType::String).with_description("Login string")
}

/// Password string.
pub fn password() -> Argument {
    Argument::new("password", ArgumentType::String).with_description("Password string")
}

/// Display name string.
pub fn name() -> Argument {
    Argument::new("name", ArgumentType::String).with_description("Name string")
}

/// Email address.
pub fn email() -> Argument {
    Argument::new("email", ArgumentType::String)
        .with_description("Email string")
        .with_regexp(REGEXP_EMAIL)
}

/// Count of items to return.
pub fn count() -> Argument {
    Argument::new("count", ArgumentType::Integer).with_description("Count of items")
}

/// Offset into the item list.
pub fn offset() -> Argument {
    Argument::new("offset", ArgumentType::Integer).with_description("Items offset")
}

/// Include deleted and undeleted items.
pub fn deleted() -> Argument {
    Argument::new("deleted", ArgumentType::Boolean)
        .with_description("Get deleted and undeleted items")
}

/// Signup confirmed flag.
pub fn active() -> Argument {
    Argument::new("active", ArgumentType::Boolean).with_description("Signup confirmed")
}

/// Items created after this timestamp.
pub fn created_later() -> Argument {
    Argument::new("created_later", ArgumentType::DateTime)
        .with_description("Created later than time")
}

/// Items created before this timestamp.
pub fn created_earlier() -> Argument {
    Argument::new("created_earlier", ArgumentType::DateTime)
        .with_description("Created earlier than time")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_presets_are_adjustable() {
        let arg = count().required();
        assert_eq!(arg.name, "count");
        assert!(arg.required);
    }

    #[test]
    fn test_email_pattern() {
        let arg = email();
        assert!(arg.matches(&Value::from("user@example.com")).unwrap());
        assert!(!arg.matches(&Value::from("not-an-email")).unwrap());
    }

    #[test]
    fn test_uuid_pattern() {
        let arg = uuid_id();
        assert!(
            arg.matches(&Value::from("01234567-89ab-cdef-0123-456789abcdef"))
                .unwrap()
        );
        assert!(!arg.matches(&Value::from("01234567")).unwrap());
    }
}
