//! The API instance: command registry, dispatch pipeline, middleware, and
//! self-description.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::argument::{Argument, ArgumentSet};
use crate::command::{BoxError, Command, CommandRegistry, Handler};
use crate::context::{ApiContext, Context};
use crate::error::{
    ApiError, ERR_INVALID_REQUEST, ERR_UNKNOWN, ERR_UNKNOWN_COMMAND, ErrorCatalog,
};
use crate::example::Example;
use crate::request::Request;
use crate::response::Response;
use crate::types::{ArgumentType, TypeRegistry};
use crate::validate::validate_request;

/// A handler-wrapping transform. Middleware registered first runs
/// outermost at dispatch time.
pub type Middleware = Box<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Replaceable hook invoked whenever a dispatch produces an error. The
/// error is already normalized to a typed [`ApiError`]; the default hook
/// attaches it to the response.
pub type ErrorHandler = Box<dyn Fn(ApiError, &mut dyn Context) + Send + Sync>;

/// Default prefix routing query keys into the `set` group.
pub const DEFAULT_PREFIX_SET: &str = "2-";
/// Default prefix routing query keys into the `where` group.
pub const DEFAULT_PREFIX_WHERE: &str = "4-";

/// A self-describing command API.
///
/// Hosts register commands, middleware, and custom error codes during
/// single-threaded setup, then serve requests through
/// [`execute`](Api::execute), which only needs `&self`: the schema is
/// shared read-only across in-flight dispatches.
///
/// # Examples
///
/// ```
/// use command_api_core::{Api, Command, Context, Request};
///
/// let mut api = Api::new();
/// api.description = "My Service API".to_string();
/// api.add_command(
///     Command::new("info")
///         .with_description("Get information about service.")
///         .with_handler(|c: &mut dyn Context| {
///             c.response_mut().result = Some(serde_json::json!({
///                 "name": "mysrv",
///                 "version": "1.0.0",
///             }));
///             Ok(())
///         }),
/// );
///
/// let response = api.execute(Some(Request::new("info")));
/// assert!(response.error.is_none());
/// assert_eq!(response.result.unwrap()["name"], "mysrv");
/// ```
pub struct Api {
    /// Human description of the whole API.
    pub description: String,
    /// Schema of the request envelope, for the self-description catalog.
    pub request_format: ArgumentSet,
    /// Schema of the response envelope, for the self-description catalog.
    pub response_format: ArgumentSet,
    /// Registered commands.
    pub commands: CommandRegistry,
    /// Error code catalog; extend with host codes during setup.
    pub errors: ErrorCatalog,
    /// Type coercion registry; override or extend during setup.
    pub types: TypeRegistry,
    /// Query-key prefix for the `args` group (catch-all by default).
    pub prefix_arguments: String,
    /// Query-key prefix for the `set` group.
    pub prefix_set: String,
    /// Query-key prefix for the `where` group.
    pub prefix_where: String,
    error_handler: ErrorHandler,
    middleware: Vec<Middleware>,
}

impl Default for Api {
    fn default() -> Self {
        Api::new()
    }
}

impl Api {
    /// Creates an API with the built-in error catalog, built-in type
    /// coercions, the default query prefixes, and the `help` command
    /// pre-registered.
    pub fn new() -> Self {
        let id = Argument::new("id", ArgumentType::String)
            .with_description("Request identifier (for debugging)");
        let datetime = Argument::new("datetime", ArgumentType::String)
            .with_description("Datetime string (ISO 8601)");
        let session = Argument::new("session", ArgumentType::Uuid).with_description(
            "Session token uuid, formatted like \"01234567-89ab-cdef-0123-456789abcdef\"",
        );
        let command = Argument::new("command", ArgumentType::String)
            .with_description("Command name string")
            .required();
        let args = Argument::new("args", ArgumentType::Object)
            .with_description("Extra request parameters, one-level object");
        let where_ = Argument::new("where", ArgumentType::Array)
            .with_description("Search item(s) parameters, simple array of one-level objects");
        let set = Argument::new("set", ArgumentType::Object)
            .with_description("Item(s) data to set, one-level object");
        let result = Argument::new("result", ArgumentType::Object)
            .with_description("Result object set by the command handler");
        let error = Argument::new("error", ArgumentType::Object)
            .with_description("Error object. Contains `code` and `desc` fields");

        let mut api = Api {
            description: String::new(),
            request_format: ArgumentSet::new()
                .with(id.clone())
                .with(datetime.clone())
                .with(session.clone())
                .with(command.clone())
                .with(args.clone())
                .with(where_)
                .with(set),
            response_format: ArgumentSet::new()
                .with(id)
                .with(datetime)
                .with(session)
                .with(command)
                .with(args)
                .with(result)
                .with(error),
            commands: CommandRegistry::new(),
            errors: ErrorCatalog::builtin(),
            types: TypeRegistry::default(),
            prefix_arguments: String::new(),
            prefix_set: DEFAULT_PREFIX_SET.to_string(),
            prefix_where: DEFAULT_PREFIX_WHERE.to_string(),
            error_handler: Box::new(|err: ApiError, c: &mut dyn Context| {
                c.response_mut().error = Some(err);
            }),
            middleware: Vec::new(),
        };
        api.add_command(help_command());
        api
    }

    /// Builds a typed error from the catalog.
    pub fn error(&self, code: i32) -> ApiError {
        self.errors.get(code)
    }

    /// Builds a typed error carrying an underlying cause.
    pub fn error_internal(&self, code: i32, internal: BoxError) -> ApiError {
        self.errors.get(code).with_internal(internal)
    }

    /// Registers a command, replacing any existing command with the same
    /// name.
    pub fn add_command(&mut self, command: Command) {
        self.commands.remove(&command.name);
        self.commands.add(command);
    }

    /// Removes a command, returning it when it was registered.
    pub fn remove_command(&mut self, name: &str) -> Option<Command> {
        self.commands.remove(name)
    }

    /// Finds a registered command by name.
    pub fn get_command(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Appends a middleware. The first registered middleware runs
    /// outermost around the handler.
    pub fn use_middleware<F>(&mut self, middleware: F)
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        self.middleware.push(Box::new(middleware));
    }

    /// Replaces the error-handler hook.
    pub fn set_error_handler<F>(&mut self, handler: F)
    where
        F: Fn(ApiError, &mut dyn Context) + Send + Sync + 'static,
    {
        self.error_handler = Box::new(handler);
    }

    /// Executes a request and always produces a response.
    ///
    /// `None` stands for a request the transport failed to parse and
    /// yields an `InvalidRequest` error response. Resolution, validation,
    /// and the middleware-wrapped handler run in order, each failure
    /// short-circuiting the rest; the resulting error (if any) is
    /// normalized to a typed [`ApiError`] and handed to the error-handler
    /// hook. Response metadata is reconciled from the request in every
    /// case.
    pub fn execute(&self, request: Option<Request>) -> Response {
        let supplied = request.is_some();
        let request = request.unwrap_or_default();
        let command = self
            .get_command(&request.command)
            .cloned()
            .unwrap_or_default();
        debug!(command = %request.command, supplied, "executing request");

        let mut ctx = ApiContext::new(self, request, command);
        if let Err(err) = self.dispatch(&mut ctx, supplied) {
            let err = self.normalize_error(err);
            debug!(command = %ctx.request.command, code = err.code, "request failed");
            (self.error_handler)(err, &mut ctx);
        }

        let ApiContext {
            request,
            mut response,
            ..
        } = ctx;
        response.fill_missing_from(&request);
        response
    }

    fn dispatch(&self, ctx: &mut ApiContext<'_>, supplied: bool) -> Result<(), BoxError> {
        if !supplied {
            return Err(self.error(ERR_INVALID_REQUEST).into());
        }
        if !ctx.command.is_valid() {
            return Err(self.error(ERR_UNKNOWN_COMMAND).into());
        }
        validate_request(&mut ctx.request, &ctx.command, &self.types, &self.errors)?;

        let Some(base) = ctx.command.handler.clone() else {
            return Err(self.error(ERR_UNKNOWN_COMMAND).into());
        };
        let mut handler = base;
        for wrap in self.middleware.iter().rev() {
            handler = wrap(handler);
        }
        handler(ctx)
    }

    /// Passes typed errors through; wraps anything else into `Unknown`
    /// with the original message appended and the original kept as the
    /// internal cause.
    fn normalize_error(&self, err: BoxError) -> ApiError {
        match err.downcast::<ApiError>() {
            Ok(typed) => *typed,
            Err(other) => {
                let mut unknown = self.error(ERR_UNKNOWN);
                unknown.description = format!("{}: {}", unknown.description, other);
                unknown.internal = Some(other.into());
                unknown
            }
        }
    }

    /// Builds the self-description snapshot: API metadata, envelope
    /// formats, the command catalog with example text forms rendered, and
    /// the error catalog.
    pub fn describe(&self) -> ApiDescription {
        let mut commands = CommandRegistry::new();
        for command in self.commands.iter() {
            let mut command = command.clone();
            command.examples = command.examples.iter().map(Example::rendered).collect();
            commands.add(command);
        }
        ApiDescription {
            description: self.description.clone(),
            request_format: self.request_format.clone(),
            response_format: self.response_format.clone(),
            commands,
            errors: self.errors.clone(),
        }
    }
}

/// Serializable snapshot of the whole API surface, the payload of the
/// `help` command.
#[derive(Debug, Clone, Serialize)]
pub struct ApiDescription {
    /// Human description of the API.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Request envelope schema.
    #[serde(skip_serializing_if = "ArgumentSet::is_empty")]
    pub request_format: ArgumentSet,
    /// Response envelope schema.
    #[serde(skip_serializing_if = "ArgumentSet::is_empty")]
    pub response_format: ArgumentSet,
    /// All registered commands, examples rendered.
    #[serde(skip_serializing_if = "CommandRegistry::is_empty")]
    pub commands: CommandRegistry,
    /// The error catalog.
    #[serde(skip_serializing_if = "ErrorCatalog::is_empty")]
    pub errors: ErrorCatalog,
}

/// Timestamp used by the stock `help` example.
fn help_example_datetime() -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339("2018-10-16T09:58:03.487508407Z")
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn help_command() -> Command {
    let mut example_request = Request::new("help");
    example_request.datetime = help_example_datetime();
    Command::new("help")
        .with_description("Get list of commands")
        .with_handler(|c: &mut dyn Context| {
            let description = c.api().describe();
            c.response_mut().result = Some(serde_json::to_value(&description)?);
            Ok(())
        })
        .with_example(
            Example::new("simple help", example_request)
                .with_description("simple help command usage example"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registers_help() {
        let api = Api::new();
        assert!(api.get_command("help").is_some());
        assert_eq!(api.commands.len(), 1);
        assert_eq!(api.request_format.len(), 7);
        assert_eq!(api.response_format.len(), 7);
    }

    #[test]
    fn test_add_command_replaces_same_name() {
        let mut api = Api::new();
        api.add_command(Command::new("info").with_description("first"));
        api.add_command(Command::new("info").with_description("second"));

        assert_eq!(api.commands.len(), 2);
        assert_eq!(api.get_command("info").unwrap().description, "second");
    }

    #[test]
    fn test_describe_renders_example_texts() {
        let api = Api::new();
        let description = api.describe();
        let help = description.commands.get("help").unwrap();
        assert!(help.examples[0].request.json.contains("\"command\": \"help\""));

        // Registered commands stay untouched.
        assert!(api.get_command("help").unwrap().examples[0].request.json.is_empty());
    }

    #[test]
    fn test_normalize_error_wraps_untyped() {
        let api = Api::new();
        let wrapped = api.normalize_error("socket hiccup".into());
        assert_eq!(wrapped.code, ERR_UNKNOWN);
        assert_eq!(wrapped.description, "unknown error occurred: socket hiccup");
        assert!(wrapped.internal.is_some());

        let typed = api.normalize_error(Box::new(api.error(ERR_UNKNOWN_COMMAND)));
        assert_eq!(typed.code, ERR_UNKNOWN_COMMAND);
        assert_eq!(typed.description, "unknown command");
    }
}
