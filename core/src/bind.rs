//! Query-string binding: maps key-value pairs into a request's parameter
//! groups.
//!
//! Keys are routed by prefix: `set` first, then `where`, then the
//! `arguments` catch-all (its default prefix is empty, so it matches
//! anything left). A multi-valued key only becomes a list when the matching
//! declared argument is `multiple`; otherwise the first value wins. Values
//! arrive as strings; type coercion happens later, during validation.

use url::Url;

use crate::api::Api;
use crate::argument::ArgumentSet;
use crate::request::Request;
use crate::value::{Value, ValueMap};

impl Api {
    /// Binds a URL's query pairs into a request, creating an empty request
    /// when none is given.
    ///
    /// The request's `command` must already be set (typically from the
    /// path) for `multiple` lookups to resolve against the right command.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_api_core::{Api, Request, Value};
    /// use url::Url;
    ///
    /// let api = Api::new();
    /// let url = Url::parse("http://localhost/api?count=5&2-login=alice").unwrap();
    /// let request = api.request_from_url(Some(Request::new("user.get")), &url);
    ///
    /// assert_eq!(request.arguments["count"], Value::from("5"));
    /// assert_eq!(request.set["login"], Value::from("alice"));
    /// ```
    pub fn request_from_url(&self, request: Option<Request>, url: &Url) -> Request {
        let mut request = request.unwrap_or_default();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        self.bind_query(&mut request, &pairs);
        request
    }

    /// Binds query pairs into the request's three parameter groups.
    ///
    /// Query binding populates exactly one `where` group (index 0), even
    /// though the request model supports several; callers needing more
    /// filter groups must construct them directly.
    pub fn bind_query(&self, request: &mut Request, pairs: &[(String, String)]) {
        let command = self.get_command(&request.command);
        let (args_schema, where_schema, set_schema) = match command {
            Some(cmd) => (&cmd.arguments, &cmd.where_, &cmd.set),
            None => (&EMPTY, &EMPTY, &EMPTY),
        };

        for (key, values) in group_pairs(pairs) {
            let Some(first) = values.first() else {
                continue;
            };
            if key.starts_with(&self.prefix_set) {
                let name = key[self.prefix_set.len()..].to_string();
                let value = query_value(first, &values, is_multiple(set_schema, &name));
                request.set.insert(name, value);
            } else if key.starts_with(&self.prefix_where) {
                let name = key[self.prefix_where.len()..].to_string();
                let value = query_value(first, &values, is_multiple(where_schema, &name));
                if request.where_.is_empty() {
                    request.where_.push(ValueMap::new());
                }
                if let Some(group) = request.where_.first_mut() {
                    group.insert(name, value);
                }
            } else if key.starts_with(&self.prefix_arguments) {
                let name = key[self.prefix_arguments.len()..].to_string();
                let value = query_value(first, &values, is_multiple(args_schema, &name));
                request.arguments.insert(name, value);
            }
        }
    }
}

static EMPTY: ArgumentSet = ArgumentSet::new();

/// Collects repeated keys while preserving first-seen order.
fn group_pairs(pairs: &[(String, String)]) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in pairs {
        match grouped.iter_mut().find(|(name, _)| name == key) {
            Some((_, values)) => values.push(value.clone()),
            None => grouped.push((key.clone(), vec![value.clone()])),
        }
    }
    grouped
}

fn is_multiple(schema: &ArgumentSet, name: &str) -> bool {
    schema.get(name).is_some_and(|arg| arg.multiple)
}

fn query_value(first: &str, values: &[String], multiple: bool) -> Value {
    if multiple {
        Value::List(values.iter().map(|v| Value::from(v.as_str())).collect())
    } else {
        Value::from(first)
    }
}
