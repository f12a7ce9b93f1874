//! Cursor-based pagination over list endpoints.
//!
//! A listing endpoint answers with one page of a named collection plus
//! `next_cursor` / `previous_cursor` tokens. A [`Cursor`] holds one page
//! and the request that produced it, so it can re-issue that request with
//! `cursor` set to the next token.
//!
//! Token `0` means "no further pages". The first request carries
//! [`START_CURSOR`] (`-1`) unless the caller already set `cursor`, which
//! keeps "start of list" distinct from an explicit cursor `0`.
//!
//! ```ignore
//! let ids: Cursor<Value> = client
//!     .cursor("ids", Request::get("/1.1/followers/ids.json", options))
//!     .await?;
//! let mut all = ids.into_stream();
//! while let Some(id) = all.try_next().await? {
//!     println!("{id}");
//! }
//! ```

use futures::{Stream, TryStreamExt};
use serde::de::Error as _;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, RateLimit, Result};
use crate::rest::hydrate::{Hydrate, hydrate_records, json_type};
use crate::transport::Request;

/// Cursor value that asks for the first page.
pub const START_CURSOR: i64 = -1;

/// Cursor value that marks the last page.
pub const END_CURSOR: i64 = 0;

/// One page of a cursored listing.
///
/// Not rewindable: to start over, build a fresh cursor from
/// [`request`](Cursor::request) with `cursor` removed.
pub struct Cursor<T> {
    client: Client,
    collection_name: String,
    request: Request,
    items: Vec<T>,
    next_cursor: i64,
    previous_cursor: i64,
    attrs: Map<String, Value>,
}

impl<T: Hydrate> Cursor<T> {
    /// Fetch the first page. Injects `cursor = -1` when the request has none.
    pub async fn first_page(
        client: Client,
        collection_name: impl Into<String>,
        mut request: Request,
    ) -> Result<Self> {
        if request.option("cursor").is_none_or(Value::is_null) {
            request = request.with_option("cursor", START_CURSOR);
        }
        Self::fetch(client, collection_name.into(), request).await
    }

    /// Fetch the page after this one, or `None` on the last page.
    pub async fn next_page(&self) -> Result<Option<Self>> {
        let Some(request) = self.next_request() else {
            return Ok(None);
        };
        Self::fetch(self.client.clone(), self.collection_name.clone(), request)
            .await
            .map(Some)
    }

    async fn fetch(client: Client, collection_name: String, request: Request) -> Result<Self> {
        let response = client.perform(&request).await?;
        let rate_limit = RateLimit::from_headers(&response.headers);
        let (items, attrs) = Self::page_contents(response.body, &collection_name)
            .map_err(|e| e.with_rate_limit(rate_limit))?;
        let next_cursor = cursor_value(attrs.get("next_cursor"));
        let previous_cursor = cursor_value(attrs.get("previous_cursor"));

        debug!(
            "{} page: {} {}(s), next_cursor={}",
            request.path,
            items.len(),
            collection_name,
            next_cursor
        );

        Ok(Self {
            client,
            collection_name,
            request,
            items,
            next_cursor,
            previous_cursor,
            attrs,
        })
    }

    /// Split a page body into its hydrated collection and the remaining
    /// attributes.
    fn page_contents(
        body: Value,
        collection_name: &str,
    ) -> Result<(Vec<T>, Map<String, Value>)> {
        let mut attrs = match body {
            Value::Object(map) => map,
            other => {
                return Err(Error::hydration::<T>(serde_json::Error::custom(format!(
                    "expected a page object, got {}",
                    json_type(&other)
                ))));
            }
        };

        let records = match attrs.remove(collection_name) {
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(Error::hydration::<T>(serde_json::Error::custom(format!(
                    "`{collection_name}` is {}, not an array",
                    json_type(&other)
                ))));
            }
            None => {
                return Err(Error::hydration::<T>(serde_json::Error::custom(format!(
                    "page has no `{collection_name}` collection"
                ))));
            }
        };
        Ok((hydrate_records(records)?, attrs))
    }

    /// Every item from this page onward, fetching pages lazily.
    ///
    /// Drains the current page before requesting the next one. Pages that
    /// come back empty but not terminal are skipped.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<T>> + Send
    where
        T: Send + 'static,
    {
        let pending = std::mem::take(&mut self.items).into_iter();
        futures::stream::try_unfold((self, pending), |(mut cursor, mut pending)| async move {
            loop {
                if let Some(item) = pending.next() {
                    return Ok::<_, Error>(Some((item, (cursor, pending))));
                }
                let Some(request) = cursor.next_request() else {
                    return Ok(None);
                };
                let mut next =
                    Self::fetch(cursor.client.clone(), cursor.collection_name.clone(), request)
                        .await?;
                pending = std::mem::take(&mut next.items).into_iter();
                cursor = next;
            }
        })
    }

    /// Collect every remaining item across all pages.
    pub async fn collect_all(self) -> Result<Vec<T>>
    where
        T: Send + 'static,
    {
        self.into_stream().try_collect().await
    }
}

impl<T> Cursor<T> {
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Items on this page.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn next_cursor(&self) -> i64 {
        self.next_cursor
    }

    pub fn previous_cursor(&self) -> i64 {
        self.previous_cursor
    }

    /// The request that produced this page.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Page fields other than the collection (cursor tokens included).
    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor == END_CURSOR
    }

    /// The request for the following page, or `None` on the last page.
    fn next_request(&self) -> Option<Request> {
        if self.is_last() {
            return None;
        }
        Some(self.request.clone().with_option("cursor", self.next_cursor))
    }

    pub fn has_more(&self) -> bool {
        !self.is_last()
    }
}

impl<T> std::fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("collection_name", &self.collection_name)
            .field("path", &self.request.path)
            .field("items", &self.items.len())
            .field("next_cursor", &self.next_cursor)
            .field("previous_cursor", &self.previous_cursor)
            .finish()
    }
}

/// Cursor token from a page field. Missing or unreadable tokens are terminal.
fn cursor_value(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(END_CURSOR),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(END_CURSOR),
        _ => END_CURSOR,
    }
}
