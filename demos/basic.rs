//! Register a command, execute a request, print both wire forms.
//!
//! ```bash
//! cargo run -p command-api-demos --example basic
//! ```

use command_api_core::{Api, Argument, ArgumentType, Command, Context, Request, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut api = Api::new();
    api.description = "My self documented API".to_string();

    api.add_command(
        Command::new("info")
            .with_description("Get information about service.")
            .with_argument(
                Argument::new("verbose", ArgumentType::Boolean)
                    .with_description("Include build details"),
            )
            .with_handler(|c: &mut dyn Context| {
                let verbose = c
                    .request()
                    .arguments
                    .get("verbose")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let mut result = serde_json::json!({
                    "name": "mysrv",
                    "version": "1.0.0",
                });
                if verbose {
                    result["description"] = "My Service".into();
                }
                c.response_mut().result = Some(result);
                Ok(())
            }),
    );

    let mut request = Request::new("info");
    request.id = "example-1".to_string();
    request.arguments.insert("verbose".into(), Value::from("true"));

    let response = api.execute(Some(request));
    println!("JSON:\n{}", serde_json::to_string_pretty(&response)?);

    // The help command serializes the whole catalog.
    let help = api.execute(Some(Request::new("help")));
    println!(
        "\nhelp lists {} commands",
        help.result
            .as_ref()
            .and_then(|r| r["commands"].as_array())
            .map(Vec::len)
            .unwrap_or(0),
    );
    Ok(())
}
