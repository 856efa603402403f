//! Self-describing command dispatch.
//!
//! This crate implements a command-dispatch framework: callers submit a
//! structured [`Request`] naming a command plus loosely typed parameter
//! groups, the framework validates and coerces those parameters against
//! the command's declared schema, routes to the registered handler, and
//! produces a structured [`Response`]. A built-in `help` command reflects
//! the entire command/argument/error catalog with worked examples.
//!
//! The main pieces:
//!
//! - [`Api`] — command registry, dispatch pipeline, middleware chain, and
//!   self-description.
//! - [`Command`] — a named operation with three independent argument
//!   groups: general `arguments`, `where` filter criteria, and the `set`
//!   mutation payload.
//! - [`Argument`] / [`ArgumentSet`] — parameter schemas with type tags,
//!   nullability, list-ness, required-ness, and regex constraints.
//! - [`TypeRegistry`] — pluggable coercion of loosely typed [`Value`]s
//!   into declared types ([`validate_request`] is the engine driving it).
//! - [`ApiError`] / [`ErrorCatalog`] — integer-coded wire errors with
//!   catalog-backed descriptions.
//!
//! # Example
//!
//! ```
//! use command_api_core::{Api, Argument, ArgumentType, Command, Context, Request, Value};
//!
//! let mut api = Api::new();
//! api.add_command(
//!     Command::new("echo")
//!         .with_description("Echo a greeting")
//!         .with_argument(Argument::new("name", ArgumentType::String).required())
//!         .with_handler(|c: &mut dyn Context| {
//!             let name = c.request().arguments["name"].to_string();
//!             c.response_mut().result = Some(serde_json::json!({ "greeting": name }));
//!             Ok(())
//!         }),
//! );
//!
//! let mut request = Request::new("echo");
//! request.id = "req-1".to_string();
//! request.arguments.insert("name".into(), Value::from("world"));
//!
//! let response = api.execute(Some(request));
//! assert!(response.error.is_none());
//! assert_eq!(response.id, "req-1");
//! assert_eq!(response.result.unwrap()["greeting"], "world");
//! ```

mod api;
mod argument;
mod bind;
mod command;
mod context;
mod duration;
mod error;
mod example;
pub mod presets;
mod request;
mod response;
mod types;
mod validate;
mod value;

pub use api::{Api, ApiDescription, DEFAULT_PREFIX_SET, DEFAULT_PREFIX_WHERE, ErrorHandler, Middleware};
pub use argument::{Argument, ArgumentSet};
pub use command::{BoxError, Command, CommandRegistry, Handler};
pub use context::Context;
pub use duration::{Duration, ParseDurationError};
pub use error::{
    ApiError, ERR_ARGUMENT_REGEXP_MATCH_FAILS, ERR_INVALID_ARGUMENT_REGEXP,
    ERR_INVALID_ARGUMENT_VALUE, ERR_INVALID_REQUEST, ERR_REQUIRED_ARGUMENT_MISSING, ERR_UNKNOWN,
    ERR_UNKNOWN_ARGUMENT, ERR_UNKNOWN_COMMAND, ErrorCatalog, LAST_USED_ERROR_CODE,
};
pub use example::{Example, ExampleRequest, ExampleResponse};
pub use request::Request;
pub use response::Response;
pub use types::{ArgumentType, CoerceError, CoerceFn, TypeRegistry};
pub use validate::validate_request;
pub use value::{Value, ValueMap};
