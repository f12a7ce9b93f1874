//! Convenience re-exports for endpoint code.
//!
//! ```ignore
//! use chirp_rs::prelude::*;
//! ```
//!
//! Covers the client, request types, identifiers, hydration and the error
//! types. Code constants ([`error::codes`](crate::error::codes)) and the
//! bounded fan-out live in their modules.

// ── Client ──────────────────────────────────────────────────────────
pub use crate::client::{Client, Identity};
pub use crate::config::ClientConfig;

// ── Transport ───────────────────────────────────────────────────────
pub use crate::transport::{FnTransport, Options, Request, Response, Transport};

// ── Plumbing ────────────────────────────────────────────────────────
pub use crate::rest::{
    Argument, Arguments, Cursor, Hydrate, Identified, Identifier, extract_id, merge_identifier,
    merge_identifiers, parallel_map,
};

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{ApiError, Error, ErrorKind, RateLimit, Result, ResultExt};
