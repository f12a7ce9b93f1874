//! Issue raw API calls through the chirp client and print the JSON.
//!
//! Configuration comes from `CHIRP_BASE_URL`, `CHIRP_BEARER_TOKEN` and
//! `CHIRP_TIMEOUT_SECS`. Logging goes to stderr, filtered by `RUST_LOG`
//! (default `warn`).
//!
//! # Examples
//!
//! ```sh
//! # One call, pretty-printed body
//! chirp get /1.1/statuses/show.json -p id=20
//!
//! # Walk every page of a cursored listing
//! chirp walk /1.1/followers/ids.json --collection ids -p screen_name=sferik
//!
//! # Bulk user lookup, mixing ids, names and profile URLs
//! chirp lookup 783214 sferik https://twitter.com/twitterapi
//! ```

use chirp_rs::rest::Identifier;
use chirp_rs::{Client, ClientConfig, Options, Request};
use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use serde_json::Value;
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "chirp", version)]
struct Cli {
    /// Override the API origin (otherwise CHIRP_BASE_URL or the default)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// GET one path and print the response body
    Get {
        path: String,

        /// Request option as key=value (repeatable)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },

    /// Stream every item of a cursored listing, one JSON value per line
    Walk {
        path: String,

        /// Name of the array field holding each page's items
        #[arg(long)]
        collection: String,

        /// Stop after this many items
        #[arg(long)]
        limit: Option<usize>,

        /// Request option as key=value (repeatable)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },

    /// Look up users by id, screen name or profile URL
    Lookup {
        #[arg(required = true)]
        users: Vec<String>,

        /// Lookup endpoint
        #[arg(long, default_value = "/1.1/users/lookup.json")]
        path: String,
    },
}

/// Parse `key=value` pairs into options. Values that read as JSON (numbers,
/// booleans) keep that type; anything else is a string.
fn parse_params(params: &[String]) -> Result<Options, String> {
    let mut options = Options::new();
    for param in params {
        let (key, raw) = param
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{param}'"))?;
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
            _ => Value::String(raw.to_string()),
        };
        options.insert(key.to_string(), value);
    }
    Ok(options)
}

/// Numeric arguments are ids; everything else is a name or URL.
fn parse_identifier(text: &str) -> Identifier {
    match text.parse::<i64>() {
        Ok(id) => Identifier::NumericId(id),
        Err(_) => Identifier::from(text),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    let client = Client::new(config).map_err(|e| e.to_string())?;

    match cli.command {
        Command::Get { path, params } => {
            let request = Request::get(path, parse_params(&params)?);
            let response = client.perform(&request).await.map_err(|e| e.to_string())?;
            println!("{}", pretty(&response.body));
        }
        Command::Walk {
            path,
            collection,
            limit,
            params,
        } => {
            let request = Request::get(path, parse_params(&params)?);
            let first = client
                .cursor::<Value>(collection, request)
                .await
                .map_err(|e| e.to_string())?;
            let mut items = Box::pin(first.into_stream());
            let mut printed = 0usize;
            while limit.is_none_or(|max| printed < max) {
                match items.try_next().await.map_err(|e| e.to_string())? {
                    Some(item) => println!("{item}"),
                    None => break,
                }
                printed += 1;
            }
        }
        Command::Lookup { users, path } => {
            let identifiers: Vec<Identifier> = users.iter().map(|u| parse_identifier(u)).collect();
            let request = Request::get(path, Options::new());
            let found: Vec<Value> = client
                .objects_in_batches(&request, &identifiers)
                .await
                .map_err(|e| e.to_string())?;
            println!("{}", pretty(&Value::Array(found)));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
