//! Per-request context.
//!
//! The context is a capability bundle handed to handlers and middleware: it
//! exposes the request, the response under construction, the resolved
//! command, and typed-error constructors backed by the owning API's error
//! catalog. It is a trait so middleware can wrap the framework
//! implementation in delegating decorators; a tracing middleware, for
//! example, can hand the handler a context that counts response accesses.

use crate::api::Api;
use crate::command::{BoxError, Command};
use crate::error::ApiError;
use crate::request::Request;
use crate::response::Response;

/// Capabilities available to a handler during one dispatch.
///
/// All state reachable through a context is exclusively owned by the
/// dispatch invocation handling the request; nothing is shared across
/// in-flight requests.
pub trait Context {
    /// The owning API instance (read-only during dispatch).
    fn api(&self) -> &Api;

    /// The inbound request, with validated groups already coerced.
    fn request(&self) -> &Request;

    /// Mutable access to the request.
    fn request_mut(&mut self) -> &mut Request;

    /// The response under construction.
    fn response(&self) -> &Response;

    /// Mutable access to the response.
    fn response_mut(&mut self) -> &mut Response;

    /// The resolved command (empty and invalid when resolution failed).
    fn command(&self) -> &Command;

    /// Builds a typed error from the API's catalog.
    fn error(&self, code: i32) -> ApiError {
        self.api().error(code)
    }

    /// Builds a typed error carrying an underlying cause.
    fn error_internal(&self, code: i32, internal: BoxError) -> ApiError {
        self.api().error(code).with_internal(internal)
    }
}

/// The framework context implementation, created per dispatch.
pub(crate) struct ApiContext<'a> {
    pub(crate) api: &'a Api,
    pub(crate) request: Request,
    pub(crate) response: Response,
    pub(crate) command: Command,
}

impl<'a> ApiContext<'a> {
    pub(crate) fn new(api: &'a Api, request: Request, command: Command) -> Self {
        ApiContext {
            api,
            request,
            response: Response::new(),
            command,
        }
    }
}

impl Context for ApiContext<'_> {
    fn api(&self) -> &Api {
        self.api
    }

    fn request(&self) -> &Request {
        &self.request
    }

    fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    fn response(&self) -> &Response {
        &self.response
    }

    fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    fn command(&self) -> &Command {
        &self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_has_placeholder_error() {
        let api = Api::new();
        let ctx = ApiContext::new(&api, Request::new("help"), Command::default());
        assert_eq!(ctx.response().error.as_ref().map(|e| e.code), Some(0));
    }

    #[test]
    fn test_command_resolution_state() {
        let api = Api::new();
        let resolved = api.get_command("help").cloned().unwrap_or_default();
        let ctx = ApiContext::new(&api, Request::new("help"), resolved);
        assert!(ctx.command().is_valid());

        let missing = api.get_command("nope").cloned().unwrap_or_default();
        let ctx = ApiContext::new(&api, Request::new("nope"), missing);
        assert!(!ctx.command().is_valid());
    }

    #[test]
    fn test_error_constructors_use_catalog() {
        use crate::error::ERR_UNKNOWN_COMMAND;

        let api = Api::new();
        let ctx = ApiContext::new(&api, Request::new("x"), Command::default());
        let err = ctx.error(ERR_UNKNOWN_COMMAND);
        assert_eq!(err.description, "unknown command");

        let err = ctx.error_internal(ERR_UNKNOWN_COMMAND, "cause".into());
        assert!(err.internal.is_some());
    }
}
