//! Argument schemas and ordered argument sets.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::ArgumentType;
use crate::value::Value;

fn is_false(v: &bool) -> bool {
    !*v
}

/// Schema for one declared parameter.
///
/// An argument has a name (unique within its set), a type tag resolved
/// through the [`TypeRegistry`](crate::TypeRegistry) at validation time,
/// and constraint flags. A disabled argument is soft-hidden: excluded from
/// lookup and validation but still present in the set.
///
/// # Examples
///
/// ```
/// use command_api_core::{Argument, ArgumentType};
///
/// let count = Argument::new("count", ArgumentType::Integer)
///     .with_description("Count of items")
///     .with_regexp("^[0-9]+$")
///     .required();
/// assert!(count.required);
/// assert_eq!(count.ty, ArgumentType::Integer);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// Parameter name, unique within its set.
    pub name: String,
    /// Declared type tag.
    #[serde(rename = "type")]
    pub ty: ArgumentType,
    /// Human description for the self-description catalog.
    #[serde(default)]
    pub description: String,
    /// Whether an explicit null value is acceptable.
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    /// Whether the value is a list of the declared type.
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,
    /// Whether the parameter must be present in its group.
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Soft-hidden: excluded from lookup and validation.
    #[serde(skip)]
    pub disabled: bool,
    /// Optional pattern the stringified coerced value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp: Option<String>,
}

impl Argument {
    /// Creates an argument with the given name and type.
    pub fn new(name: impl Into<String>, ty: ArgumentType) -> Self {
        Argument {
            name: name.into(),
            ty,
            description: String::new(),
            nullable: false,
            multiple: false,
            required: false,
            disabled: false,
            regexp: None,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a pattern constraint.
    pub fn with_regexp(mut self, pattern: impl Into<String>) -> Self {
        self.regexp = Some(pattern.into());
        self
    }

    /// Marks the argument as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the argument as accepting explicit null.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the argument as list-valued.
    pub fn allow_multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Soft-hides the argument.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Matches the stringified value against the declared pattern.
    ///
    /// Returns `Ok(true)` when no non-empty pattern is declared. The error
    /// carries a pattern compile failure, which validation reports
    /// separately from a clean non-match.
    pub fn matches(&self, value: &Value) -> Result<bool, regex::Error> {
        let Some(pattern) = self.regexp.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(true);
        };
        let re = Regex::new(pattern)?;
        Ok(re.is_match(&value.to_string()))
    }
}

/// Ordered collection of [`Argument`]s with unique names.
///
/// Insertion order is preserved for documentation output; lookup is by
/// name and skips disabled entries.
///
/// # Examples
///
/// ```
/// use command_api_core::{Argument, ArgumentSet, ArgumentType};
///
/// let mut set = ArgumentSet::new();
/// set.add(Argument::new("login", ArgumentType::String));
/// set.add(Argument::new("count", ArgumentType::Integer));
///
/// assert!(set.contains("login"));
/// assert!(set.get("missing").is_none());
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentSet(Vec<Argument>);

impl ArgumentSet {
    /// Creates an empty set.
    pub const fn new() -> Self {
        ArgumentSet(Vec::new())
    }

    /// Whether a non-disabled argument with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Appends an argument.
    ///
    /// # Panics
    ///
    /// Panics when a non-disabled argument with the same name already
    /// exists; a duplicate declaration is a configuration mistake, not a
    /// recoverable validation failure.
    pub fn add(&mut self, argument: Argument) {
        if self.contains(&argument.name) {
            panic!("duplicate argument in set: {}", argument.name);
        }
        self.0.push(argument);
    }

    /// Builder-style [`add`](ArgumentSet::add).
    ///
    /// # Panics
    ///
    /// Panics on duplicate names, like [`add`](ArgumentSet::add).
    pub fn with(mut self, argument: Argument) -> Self {
        self.add(argument);
        self
    }

    /// Finds a non-disabled argument by name.
    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.0.iter().find(|arg| arg.name == name && !arg.disabled)
    }

    /// Removes an argument by name (disabled entries included), returning
    /// it when found.
    pub fn remove(&mut self, name: &str) -> Option<Argument> {
        let idx = self.0.iter().position(|arg| arg.name == name)?;
        Some(self.0.remove(idx))
    }

    /// Iterates arguments in insertion order, disabled entries included.
    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.0.iter()
    }

    /// Number of arguments, disabled entries included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Argument>> for ArgumentSet {
    fn from(arguments: Vec<Argument>) -> Self {
        let mut set = ArgumentSet::new();
        for argument in arguments {
            set.add(argument);
        }
        set
    }
}

impl FromIterator<Argument> for ArgumentSet {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        let mut set = ArgumentSet::new();
        for argument in iter {
            set.add(argument);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ArgumentSet {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
