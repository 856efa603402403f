use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use command_api_core::{Api, Request, Response};
use tracing::debug;
use url::Url;

mod demo;

/// Output format for responses and descriptions.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "command-api")]
#[command(about = "Playground for the self-documented command API")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Execute a JSON request against the demo API.
    Execute(ExecuteArgs),
    /// Build a request from a URL query string and execute it.
    Query(QueryArgs),
    /// Print the API self-description.
    Describe(DescribeArgs),
}

#[derive(Debug, Args)]
struct ExecuteArgs {
    /// Inline JSON request body (reads stdin when neither flag is given).
    #[arg(long, conflicts_with = "file")]
    request: Option<String>,
    /// Path to a JSON request file.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Output format for the response.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Command name for the request.
    #[arg(long)]
    command: String,
    /// Query string, e.g. "count=5&4-login=alice&2-email=a@b.cc".
    #[arg(long)]
    query: String,
    /// Output format for the response.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Output format for the description.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = demo::build_api();

    let outcome = match cli.command {
        CliCommand::Execute(args) => run_execute(&api, args),
        CliCommand::Query(args) => run_query(&api, args),
        CliCommand::Describe(args) => run_describe(&api, args),
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
}

fn run_execute(api: &Api, args: ExecuteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let body = match (&args.request, &args.file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    // A body that fails to parse becomes an absent request, which the
    // dispatcher reports as InvalidRequest.
    let request = serde_json::from_str::<Request>(&body).ok();
    debug!(parsed = request.is_some(), "read request body");
    let response = api.execute(request);
    print_response(&response, args.format)
}

fn run_query(api: &Api, args: QueryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = Url::parse(&format!("http://localhost/?{}", args.query))?;
    let request = api.request_from_url(Some(Request::new(args.command)), &url);
    let response = api.execute(Some(request));
    print_response(&response, args.format)
}

fn run_describe(api: &Api, args: DescribeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let description = api.describe();
    let text = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&description)?,
        OutputFormat::Yaml => serde_yaml::to_string(&description)?,
    };
    println!("{text}");
    Ok(())
}

fn print_response(
    response: &Response,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(response)?,
        OutputFormat::Yaml => serde_yaml::to_string(response)?,
    };
    println!("{text}");
    Ok(())
}
