//! Command declarations and the command registry.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::argument::{Argument, ArgumentSet};
use crate::context::Context;
use crate::example::Example;

/// Boxed error returned by handlers and middleware.
///
/// A handler may return an [`ApiError`](crate::ApiError) (used as-is) or
/// any other error (wrapped into the `Unknown` typed error by the
/// dispatcher).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A command handler: receives the per-request context and mutates the
/// response.
pub type Handler = Arc<dyn Fn(&mut dyn Context) -> Result<(), BoxError> + Send + Sync>;

/// A named, schema-declared operation.
///
/// A command owns three independent argument sets with distinct semantics:
/// general `arguments`, `where` filter criteria (validated once per search
/// item the request carries), and the `set` mutation payload. A command is
/// dispatchable only when it has a non-empty name and a handler.
///
/// # Examples
///
/// ```
/// use command_api_core::{Argument, ArgumentType, Command, Context};
///
/// let cmd = Command::new("user.get")
///     .with_description("Get existing users")
///     .with_where(Argument::new("login", ArgumentType::String))
///     .with_argument(Argument::new("count", ArgumentType::Integer))
///     .with_handler(|c: &mut dyn Context| {
///         c.response_mut().result = Some(serde_json::json!([]));
///         Ok(())
///     });
/// assert!(cmd.is_valid());
/// ```
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Command {
    /// Command name, unique within the registry.
    pub name: String,
    /// Human description for the self-description catalog.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// General parameters.
    #[serde(default, rename = "args", skip_serializing_if = "ArgumentSet::is_empty")]
    pub arguments: ArgumentSet,
    /// Filter criteria schema, applied to every `where` group.
    #[serde(default, rename = "where", skip_serializing_if = "ArgumentSet::is_empty")]
    pub where_: ArgumentSet,
    /// Mutation payload schema.
    #[serde(default, skip_serializing_if = "ArgumentSet::is_empty")]
    pub set: ArgumentSet,
    /// The operation itself.
    #[serde(skip)]
    pub handler: Option<Handler>,
    /// Worked usage examples.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
}

impl Command {
    /// Creates a command with the given name and no handler yet.
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            name: name.into(),
            ..Command::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the handler.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut dyn Context) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Declares a general argument.
    ///
    /// # Panics
    ///
    /// Panics when the name is already declared in the `arguments` set.
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.add(argument);
        self
    }

    /// Declares a filter argument.
    ///
    /// # Panics
    ///
    /// Panics when the name is already declared in the `where` set.
    pub fn with_where(mut self, argument: Argument) -> Self {
        self.where_.add(argument);
        self
    }

    /// Declares a mutation-payload argument.
    ///
    /// # Panics
    ///
    /// Panics when the name is already declared in the `set` set.
    pub fn with_set(mut self, argument: Argument) -> Self {
        self.set.add(argument);
        self
    }

    /// Adds a worked example.
    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    /// Whether the command can be dispatched: non-empty name and a handler.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.handler.is_some()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("arguments", &self.arguments)
            .field("where", &self.where_)
            .field("set", &self.set)
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .field("examples", &self.examples)
            .finish()
    }
}

/// Ordered collection of [`Command`]s with unique names.
///
/// Registration order is preserved for the self-description catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandRegistry(Vec<Command>);

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        CommandRegistry(Vec::new())
    }

    /// Whether a command with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registers a command.
    ///
    /// # Panics
    ///
    /// Panics when the name is already registered; use
    /// [`Api::add_command`](crate::Api::add_command) for replace semantics.
    pub fn add(&mut self, command: Command) {
        if self.contains(&command.name) {
            panic!("duplicate command in registry: {}", command.name);
        }
        self.0.push(command);
    }

    /// Finds a command by name.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.0.iter().find(|cmd| cmd.name == name)
    }

    /// Removes a command by name, returning it when found.
    pub fn remove(&mut self, name: &str) -> Option<Command> {
        let idx = self.0.iter().position(|cmd| cmd.name == name)?;
        Some(self.0.remove(idx))
    }

    /// Iterates commands in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.0.iter()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
