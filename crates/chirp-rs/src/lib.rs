//! Plumbing for REST API clients in the Twitter v1.1 mould.
//!
//! `chirp-rs` is the layer that per-endpoint code sits on. Endpoint helpers
//! differ only in verb, path and domain type; everything they share lives
//! here: argument normalization, identifier resolution, ordered concurrent
//! fan-out, hydration into typed objects, cursor pagination, and a typed
//! error taxonomy that carries rate-limit metadata.
//!
//! ```ignore
//! use chirp_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let client = Client::from_env()?;
//!
//!     // Whose followers? Default to the authenticated user.
//!     let options = client
//!         .merge_identifier_or_default(&Options::new(), None, None)
//!         .await?;
//!     let page: Cursor<serde_json::Value> = client
//!         .cursor("ids", Request::get("/1.1/followers/ids.json", options))
//!         .await?;
//!     for id in page.collect_all().await? {
//!         println!("{id}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Issue a call:** build a [`Request`](transport::Request) and pass it to
//!   [`Client::object`](client::Client::object),
//!   [`Client::objects`](client::Client::objects) or
//!   [`Client::cursor`](client::Client::cursor) depending on the shape of
//!   the response.
//!
//! - **Accept flexible arguments:** [`Arguments`](rest::args::Arguments)
//!   splits positional items from a trailing options map;
//!   [`Identifier`](rest::identifier::Identifier) with
//!   [`merge_identifier`](rest::identifier::merge_identifier) /
//!   [`merge_identifiers`](rest::identifier::merge_identifiers) turns ids,
//!   screen names, URLs and objects into `user_id` / `screen_name` options.
//!
//! - **Fan out per item:** [`parallel_map`](rest::parallel::parallel_map)
//!   for arbitrary work, [`Client::parallel_objects`](client::Client::parallel_objects)
//!   for one request per item, and
//!   [`Client::objects_in_batches`](client::Client::objects_in_batches) for
//!   bulk lookups split into 100-id chunks.
//!
//! - **Make a type hydratable:** implement
//!   [`Hydrate`](rest::hydrate::Hydrate). `from_record` is required;
//!   override `from_envelope` when the object needs response headers.
//!
//! - **Handle failures:** every call returns [`error::Result`]. Match on
//!   [`ErrorKind`](error::ErrorKind), read
//!   [`Error::rate_limit`](error::Error::rate_limit), and narrow 403s with
//!   [`ResultExt::disambiguate`](error::ResultExt::disambiguate).
//!
//! - **Swap the HTTP stack:** implement
//!   [`Transport`](transport::Transport), or wrap a closure in
//!   [`FnTransport`](transport::FnTransport), and hand it to
//!   [`Client::with_transport`](client::Client::with_transport).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`](client::Client) façade, default identity |
//! | [`rest`] | Arguments, identifiers, fan-out, hydration, cursors |
//! | [`error`] | [`Error`](error::Error), [`ErrorKind`](error::ErrorKind) registry, API codes, rate limits |
//! | [`transport`] | Request/response types and the [`Transport`](transport::Transport) seam |
//! | [`config`] | [`ClientConfig`](config::ClientConfig) defaults and env overrides |

pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod rest;
pub mod transport;

pub use client::{Client, Identity};
pub use config::ClientConfig;
pub use error::{ApiError, Error, ErrorKind, RateLimit, Result};
pub use transport::{Options, Request, Response};
