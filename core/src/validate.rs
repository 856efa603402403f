//! Request validation against a command's argument schemas.
//!
//! Three independent passes run in a fixed order (general `args`, the
//! `set` mutation payload, then each `where` filter group in sequence),
//! short-circuiting on the first failure. Every error description is
//! prefixed with the group that produced it (`args: `, `set: `,
//! `where[i]: `).

use std::fmt;
use std::sync::Arc;

use crate::argument::ArgumentSet;
use crate::command::Command;
use crate::error::{
    ApiError, ERR_ARGUMENT_REGEXP_MATCH_FAILS, ERR_INVALID_ARGUMENT_REGEXP,
    ERR_INVALID_ARGUMENT_VALUE, ERR_REQUIRED_ARGUMENT_MISSING, ERR_UNKNOWN_ARGUMENT, ErrorCatalog,
};
use crate::request::Request;
use crate::types::TypeRegistry;
use crate::value::ValueMap;

/// Which parameter group an error came from.
enum GroupLabel {
    Args,
    Set,
    Where(usize),
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLabel::Args => f.write_str("args"),
            GroupLabel::Set => f.write_str("set"),
            GroupLabel::Where(idx) => write!(f, "where[{idx}]"),
        }
    }
}

/// Validates and coerces the request's parameter groups against the
/// command's declared argument sets, rewriting group values in place with
/// their coerced forms.
///
/// # Examples
///
/// ```
/// use command_api_core::{
///     Argument, ArgumentType, Command, ErrorCatalog, Request, TypeRegistry, Value,
///     validate_request,
/// };
///
/// let command = Command::new("item.get")
///     .with_argument(Argument::new("count", ArgumentType::Integer).required());
/// let types = TypeRegistry::default();
/// let errors = ErrorCatalog::builtin();
///
/// let mut request = Request::new("item.get");
/// request.arguments.insert("count".into(), Value::from("10"));
/// validate_request(&mut request, &command, &types, &errors).unwrap();
/// assert_eq!(request.arguments["count"], Value::Integer(10));
/// ```
pub fn validate_request(
    request: &mut Request,
    command: &Command,
    types: &TypeRegistry,
    errors: &ErrorCatalog,
) -> Result<(), ApiError> {
    check_group(
        &mut request.arguments,
        &command.arguments,
        &GroupLabel::Args,
        types,
        errors,
    )?;
    check_group(&mut request.set, &command.set, &GroupLabel::Set, types, errors)?;
    for (idx, group) in request.where_.iter_mut().enumerate() {
        check_group(group, &command.where_, &GroupLabel::Where(idx), types, errors)?;
    }
    Ok(())
}

fn check_group(
    params: &mut ValueMap,
    args: &ArgumentSet,
    label: &GroupLabel,
    types: &TypeRegistry,
    catalog: &ErrorCatalog,
) -> Result<(), ApiError> {
    for arg in args.iter() {
        if arg.disabled {
            continue;
        }
        if arg.required && !params.contains_key(&arg.name) {
            let mut err = catalog.get(ERR_REQUIRED_ARGUMENT_MISSING);
            err.description = format!("{label}: {} ({})", err.description, arg.name);
            return Err(err);
        }
    }

    for (name, slot) in params.iter_mut() {
        let Some(arg) = args.get(name) else {
            let mut err = catalog.get(ERR_UNKNOWN_ARGUMENT);
            err.description = format!("{label}: {} ({name})", err.description);
            return Err(err);
        };

        if slot.is_null() {
            if !arg.nullable {
                let mut err = catalog.get(ERR_INVALID_ARGUMENT_VALUE);
                err.description = format!("{label}: {} ({name}): null", err.description);
                return Err(err);
            }
            // Null stays null; no coercion, no regex.
            continue;
        }

        let coerced = match types.coerce(&arg.ty, slot, arg.multiple) {
            Ok(value) => value,
            Err(cause) => {
                let mut err = catalog.get(ERR_INVALID_ARGUMENT_VALUE);
                err.description = format!("{label}: {} ({name}): {slot}", err.description);
                err.internal = Some(Arc::new(cause));
                return Err(err);
            }
        };

        match arg.matches(&coerced) {
            Err(cause) => {
                let mut err = catalog.get(ERR_INVALID_ARGUMENT_REGEXP);
                err.description = format!("{label}: {} ({name})", err.description);
                err.internal = Some(Arc::new(cause));
                return Err(err);
            }
            Ok(false) => {
                let mut err = catalog.get(ERR_ARGUMENT_REGEXP_MATCH_FAILS);
                let pattern = arg.regexp.as_deref().unwrap_or_default();
                err.description =
                    format!("{label}: {} ({name}, regexp: {pattern})", err.description);
                return Err(err);
            }
            Ok(true) => {}
        }

        *slot = coerced;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use crate::error::{
        ERR_ARGUMENT_REGEXP_MATCH_FAILS, ERR_INVALID_ARGUMENT_REGEXP, ERR_INVALID_ARGUMENT_VALUE,
        ERR_REQUIRED_ARGUMENT_MISSING, ERR_UNKNOWN_ARGUMENT,
    };
    use crate::types::ArgumentType;
    use crate::value::Value;

    fn fixture() -> (Command, TypeRegistry, ErrorCatalog) {
        let command = Command::new("item.get").with_argument(
            Argument::new("req", ArgumentType::Integer)
                .with_regexp("^\\d+$")
                .required(),
        );
        (command, TypeRegistry::default(), ErrorCatalog::builtin())
    }

    fn run(request: &mut Request, command: &Command) -> Result<(), ApiError> {
        validate_request(request, command, &TypeRegistry::default(), &ErrorCatalog::builtin())
    }

    #[test]
    fn test_valid_value_is_coerced_in_place() {
        let (command, types, errors) = fixture();
        let mut request = Request::new("item.get");
        request.arguments.insert("req".into(), Value::from("10"));

        validate_request(&mut request, &command, &types, &errors).unwrap();
        assert_eq!(request.arguments["req"], Value::Integer(10));
    }

    #[test]
    fn test_required_argument_missing() {
        let (command, types, errors) = fixture();
        let mut request = Request::new("item.get");

        let err = validate_request(&mut request, &command, &types, &errors).unwrap_err();
        assert_eq!(err.code, ERR_REQUIRED_ARGUMENT_MISSING);
        assert!(err.description.starts_with("args: "), "{}", err.description);
        assert!(err.description.contains("(req)"));
    }

    #[test]
    fn test_uncoercible_value() {
        let (command, types, errors) = fixture();
        let mut request = Request::new("item.get");
        request.arguments.insert("req".into(), Value::from("10a"));

        let err = validate_request(&mut request, &command, &types, &errors).unwrap_err();
        assert_eq!(err.code, ERR_INVALID_ARGUMENT_VALUE);
        assert!(err.internal.is_some());
    }

    #[test]
    fn test_unknown_argument() {
        let (command, types, errors) = fixture();
        let mut request = Request::new("item.get");
        request.arguments.insert("req".into(), Value::from("10"));
        request.arguments.insert("unknown".into(), Value::Bool(false));

        let err = validate_request(&mut request, &command, &types, &errors).unwrap_err();
        assert_eq!(err.code, ERR_UNKNOWN_ARGUMENT);
        assert!(err.description.contains("(unknown)"));
    }

    #[test]
    fn test_null_needs_nullable() {
        let command = Command::new("item.get")
            .with_argument(Argument::new("strict", ArgumentType::String))
            .with_argument(Argument::new("lax", ArgumentType::String).nullable());

        let mut request = Request::new("item.get");
        request.arguments.insert("strict".into(), Value::Null);
        let err = run(&mut request, &command).unwrap_err();
        assert_eq!(err.code, ERR_INVALID_ARGUMENT_VALUE);
        assert!(err.description.contains("null"));

        let mut request = Request::new("item.get");
        request.arguments.insert("lax".into(), Value::Null);
        run(&mut request, &command).unwrap();
        // Null survives untouched and skipped regex entirely.
        assert_eq!(request.arguments["lax"], Value::Null);
    }

    #[test]
    fn test_regexp_match_fails() {
        let command = Command::new("item.get")
            .with_argument(Argument::new("alias", ArgumentType::String).with_regexp("^.{0,8}$"));

        let mut request = Request::new("item.get");
        request.arguments.insert("alias".into(), Value::from("xmpl"));
        run(&mut request, &command).unwrap();

        let mut request = Request::new("item.get");
        request
            .arguments
            .insert("alias".into(), Value::from("0123456789"));
        let err = run(&mut request, &command).unwrap_err();
        assert_eq!(err.code, ERR_ARGUMENT_REGEXP_MATCH_FAILS);
        assert!(err.description.contains("regexp: ^.{0,8}$"));
    }

    #[test]
    fn test_broken_regexp_is_distinct_error() {
        let command = Command::new("item.get")
            .with_argument(Argument::new("alias", ArgumentType::String).with_regexp("^([1-9]$"));

        let mut request = Request::new("item.get");
        request.arguments.insert("alias".into(), Value::from("1"));
        let err = run(&mut request, &command).unwrap_err();
        assert_eq!(err.code, ERR_INVALID_ARGUMENT_REGEXP);
    }

    #[test]
    fn test_disabled_arguments_are_invisible() {
        let command = Command::new("item.get")
            .with_argument(Argument::new("gone", ArgumentType::String).required().disabled());

        // Not required while disabled.
        let mut request = Request::new("item.get");
        run(&mut request, &command).unwrap();

        // And not accepted either.
        let mut request = Request::new("item.get");
        request.arguments.insert("gone".into(), Value::from("x"));
        let err = run(&mut request, &command).unwrap_err();
        assert_eq!(err.code, ERR_UNKNOWN_ARGUMENT);
    }

    #[test]
    fn test_group_order_and_labels() {
        let command = Command::new("user.update")
            .with_set(Argument::new("login", ArgumentType::String).required())
            .with_where(Argument::new("id", ArgumentType::Integer));

        // The set pass runs before the where passes.
        let mut request = Request::new("user.update");
        request.where_.push(ValueMap::from([(
            "bogus".to_string(),
            Value::from("x"),
        )]));
        let err = run(&mut request, &command).unwrap_err();
        assert_eq!(err.code, ERR_REQUIRED_ARGUMENT_MISSING);
        assert!(err.description.starts_with("set: "));

        // Each where group is labeled with its index.
        let mut request = Request::new("user.update");
        request.set.insert("login".into(), Value::from("alice"));
        request
            .where_
            .push(ValueMap::from([("id".to_string(), Value::from("1"))]));
        request.where_.push(ValueMap::from([(
            "bogus".to_string(),
            Value::from("x"),
        )]));
        let err = run(&mut request, &command).unwrap_err();
        assert_eq!(err.code, ERR_UNKNOWN_ARGUMENT);
        assert!(err.description.starts_with("where[1]: "), "{}", err.description);

        // The first where group was already coerced before the failure.
        assert_eq!(request.where_[0]["id"], Value::Integer(1));
    }

    #[test]
    fn test_multiple_flag_drives_list_coercion() {
        let command = Command::new("item.get").with_argument(
            Argument::new("ids", ArgumentType::Integer).allow_multiple(),
        );

        let mut request = Request::new("item.get");
        request.arguments.insert(
            "ids".into(),
            Value::List(vec![Value::from("1"), Value::from("2")]),
        );
        run(&mut request, &command).unwrap();
        assert_eq!(
            request.arguments["ids"],
            Value::List(vec![Value::Integer(1), Value::Integer(2)]),
        );

        // A scalar where a list is declared fails coercion.
        let mut request = Request::new("item.get");
        request.arguments.insert("ids".into(), Value::from("1"));
        let err = run(&mut request, &command).unwrap_err();
        assert_eq!(err.code, ERR_INVALID_ARGUMENT_VALUE);
    }
}
