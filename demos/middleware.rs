//! Middleware ordering and short-circuiting.
//!
//! ```bash
//! cargo run -p command-api-demos --example middleware
//! ```

use std::sync::Arc;

use command_api_core::{Api, Command, Context, Handler, Request};

fn main() {
    let mut api = Api::new();

    // Registered first, runs outermost.
    api.use_middleware(|next: Handler| -> Handler {
        Arc::new(move |c: &mut dyn Context| {
            println!("-> auth check for {:?}", c.request().command);
            next(c)
        })
    });
    api.use_middleware(|next: Handler| -> Handler {
        Arc::new(move |c: &mut dyn Context| {
            println!("  -> timing starts");
            let result = next(c);
            println!("  <- timing ends");
            result
        })
    });

    api.add_command(
        Command::new("ping").with_handler(|c: &mut dyn Context| {
            println!("    handler runs");
            c.response_mut().result = Some(serde_json::json!("pong"));
            Ok(())
        }),
    );

    let response = api.execute(Some(Request::new("ping")));
    println!("result: {:?}", response.result);
}
