//! The demo user-directory API served by the playground binary.

use std::sync::{Arc, Mutex};

use command_api_core::{
    Api, ApiError, Argument, ArgumentType, Command, Context, Example, LAST_USED_ERROR_CODE,
    Request, Value, presets,
};
use serde_json::json;

/// Host-defined code: no user matched the given criteria.
pub const ERR_USER_NOT_FOUND: i32 = LAST_USED_ERROR_CODE + 1;

#[derive(Debug, Clone, serde::Serialize)]
struct User {
    id: i64,
    login: String,
    email: Option<String>,
}

type Directory = Arc<Mutex<Vec<User>>>;

fn seed_directory() -> Directory {
    Arc::new(Mutex::new(vec![
        User {
            id: 1,
            login: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
        },
        User {
            id: 2,
            login: "bob".to_string(),
            email: None,
        },
    ]))
}

/// Builds the demo API: a small in-memory user directory exercising all
/// three argument groups, presets, regex constraints, and a custom error
/// code.
pub fn build_api() -> Api {
    let mut api = Api::new();
    api.description = "User directory playground API".to_string();
    api.errors
        .add(ApiError::new(ERR_USER_NOT_FOUND, "user not found"));

    let directory = seed_directory();

    let users = directory.clone();
    let mut get_example = Request::new("user.get");
    get_example
        .arguments
        .insert("count".into(), Value::from("10"));
    api.add_command(
        Command::new("user.get")
            .with_description("Get existing single user or user list.")
            .with_argument(presets::count().with_regexp(presets::REGEXP_INTEGER))
            .with_argument(presets::offset())
            .with_where(presets::login())
            .with_where(presets::email().nullable())
            .with_example(
                Example::new("first page", get_example)
                    .with_description("list the first users in the directory"),
            )
            .with_handler(move |c: &mut dyn Context| {
                let login_filter = c
                    .request()
                    .where_
                    .first()
                    .and_then(|group| group.get("login"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let count = c
                    .request()
                    .arguments
                    .get("count")
                    .and_then(Value::as_i64)
                    .unwrap_or(i64::MAX);

                let users = users.lock().map_err(|_| "directory lock poisoned")?;
                let matched: Vec<&User> = users
                    .iter()
                    .filter(|user| {
                        login_filter
                            .as_deref()
                            .is_none_or(|login| user.login == login)
                    })
                    .take(count.max(0) as usize)
                    .collect();
                c.response_mut().result = Some(json!({ "users": matched }));
                Ok(())
            }),
    );

    let users = directory.clone();
    api.add_command(
        Command::new("user.add")
            .with_description("Create new user.")
            .with_set(presets::login().required())
            .with_set(presets::password().required())
            .with_set(presets::email())
            .with_set(presets::name())
            .with_handler(move |c: &mut dyn Context| {
                let login = c
                    .request()
                    .set
                    .get("login")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let email = c
                    .request()
                    .set
                    .get("email")
                    .and_then(Value::as_str)
                    .map(str::to_string);

                let mut users = users.lock().map_err(|_| "directory lock poisoned")?;
                let user = User {
                    id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
                    login,
                    email,
                };
                c.response_mut().result = Some(json!({ "created": &user }));
                users.push(user);
                Ok(())
            }),
    );

    let users = directory.clone();
    api.add_command(
        Command::new("user.delete")
            .with_description("Delete an existing user.")
            .with_where(presets::id().required())
            .with_argument(
                Argument::new("finally", ArgumentType::Boolean)
                    .with_description("Finally delete"),
            )
            .with_handler(move |c: &mut dyn Context| {
                let id = c
                    .request()
                    .where_
                    .first()
                    .and_then(|group| group.get("id"))
                    .and_then(Value::as_i64);

                let mut users = users.lock().map_err(|_| "directory lock poisoned")?;
                let Some(idx) = users.iter().position(|user| Some(user.id) == id) else {
                    return Err(c
                        .error(ERR_USER_NOT_FOUND)
                        .with_detail(format!("id {}", id.unwrap_or_default()))
                        .into());
                };
                let removed = users.remove(idx);
                c.response_mut().result = Some(json!({ "deleted": removed }));
                Ok(())
            }),
    );

    api
}
