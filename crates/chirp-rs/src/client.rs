//! The client façade tying transport, hydration, pagination and errors
//! together.
//!
//! [`Client`] is cheap to clone: every clone shares one transport, one
//! config, and one lazily resolved default identity. Endpoint code builds
//! a [`Request`] and picks the entry point that matches the response
//! shape:
//!
//! | Response shape            | Entry point                     |
//! |---------------------------|---------------------------------|
//! | one object                | [`Client::object`]              |
//! | array of records          | [`Client::objects`]             |
//! | cursored collection       | [`Client::cursor`]              |
//! | one object per item       | [`Client::parallel_objects`]    |
//! | bulk lookup of many ids   | [`Client::objects_in_batches`]  |

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, trace, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, ErrorKind, RateLimit, Result};
use crate::rest::args::Argument;
use crate::rest::cursor::Cursor;
use crate::rest::hydrate::{Hydrate, object_list, single_object};
use crate::rest::identifier::{Identifier, merge_identifier, merge_identifiers};
use crate::rest::parallel::parallel_map;
use crate::transport::{Options, ReqwestTransport, Request, Response, Transport};

/// The authenticated user, as reported by the credentials endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub screen_name: String,
}

struct Inner {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    identity: OnceCell<Identity>,
}

#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    /// Client over the default reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(transport, config))
    }

    /// Client configured from `CHIRP_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn with_transport(transport: impl Transport + 'static, config: ClientConfig) -> Self {
        Self::with_shared_transport(Arc::new(transport), config)
    }

    /// Client over a transport that is already shared elsewhere.
    pub fn with_shared_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                config,
                identity: OnceCell::new(),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    // ── Dispatch ───────────────────────────────────────────────────

    /// Send `request` and classify the answer.
    ///
    /// Transport failures pass through untouched. Any non-2xx status
    /// becomes [`Error::Api`] with kind, message, code and rate-limit
    /// snapshot taken from the response. A 2xx whose JSON body failed to
    /// parse becomes [`Error::Hydration`].
    ///
    /// Failures are logged at debug level only; callers that treat an
    /// error as fatal log it themselves.
    pub async fn perform(&self, request: &Request) -> Result<Response> {
        let start = Instant::now();
        let response = self.inner.transport.dispatch(request).await?;
        debug!(
            "{} {} -> HTTP {} ({:.2}s)",
            request.method,
            request.path,
            response.status,
            start.elapsed().as_secs_f64()
        );

        if response.is_success() {
            let Some(source) = response.decode_error.clone() else {
                return Ok(response);
            };
            let error = Error::malformed("response body", source)
                .with_rate_limit(RateLimit::from_headers(&response.headers));
            debug!("{} {} failed: {}", request.method, request.path, error);
            return Err(error);
        }
        let mut error = ApiError::from_response(&response);
        if let Some(source) = response.decode_error {
            error = error.with_cause(source);
        }
        debug!("{} {} failed: {}", request.method, request.path, error);
        Err(error.into())
    }

    // ── Hydration ──────────────────────────────────────────────────

    /// One object built from the whole response envelope.
    pub async fn object<T: Hydrate>(&self, request: &Request) -> Result<T> {
        let response = self.perform(request).await?;
        single_object(&response)
    }

    /// One object per element of the response array, in order.
    pub async fn objects<T: Hydrate>(&self, request: &Request) -> Result<Vec<T>> {
        let response = self.perform(request).await?;
        let rate_limit = RateLimit::from_headers(&response.headers);
        object_list(response.body).map_err(|e| e.with_rate_limit(rate_limit))
    }

    /// First page of a cursored listing whose items live under
    /// `collection_name`.
    pub async fn cursor<T: Hydrate>(
        &self,
        collection_name: impl Into<String>,
        request: Request,
    ) -> Result<Cursor<T>> {
        Cursor::first_page(self.clone(), collection_name, request).await
    }

    /// One [`object`](Self::object) call per item, run concurrently.
    ///
    /// `f` builds the request for each item. Failures whose kind is listed
    /// in `ignore` drop that item from the result; any other failure fails
    /// the whole call once every request has finished.
    pub async fn parallel_objects<I, T, F>(
        &self,
        items: I,
        ignore: &[ErrorKind],
        mut f: F,
    ) -> Result<Vec<T>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Request,
        T: Hydrate,
    {
        parallel_map(items, |item| {
            let request = f(item);
            async move {
                match self.object::<T>(&request).await {
                    Ok(object) => Ok(Some(object)),
                    Err(e) if e.kind().is_some_and(|kind| ignore.contains(&kind)) => {
                        trace!("{} skipped: {}", request.path, e);
                        Ok(None)
                    }
                    Err(e) => {
                        warn!("{} {} failed: {}", request.method, request.path, e);
                        Err(e)
                    }
                }
            }
        })
        .await
    }

    /// Bulk lookup: split `identifiers` into chunks of
    /// [`ClientConfig::batch_size`], send one copy of `request` per chunk
    /// with the chunk merged in as `user_id` / `screen_name` lists, and
    /// concatenate the hydrated arrays in chunk order.
    pub async fn objects_in_batches<T: Hydrate>(
        &self,
        request: &Request,
        identifiers: &[Identifier],
    ) -> Result<Vec<T>> {
        let batch_size = self.inner.config.batch_size.max(1);
        let requests: Vec<Request> = identifiers
            .chunks(batch_size)
            .map(|chunk| {
                let options =
                    merge_identifiers(&request.options, &[Argument::Many(chunk.to_vec())]);
                Request::new(request.method.clone(), request.path.clone(), options)
            })
            .collect();
        debug!(
            "{}: {} identifier(s) in {} batch(es)",
            request.path,
            identifiers.len(),
            requests.len()
        );

        let batches: Vec<Vec<T>> = parallel_map(requests, |batch| async move {
            self.objects::<T>(&batch).await.map(Some)
        })
        .await?;
        Ok(batches.into_iter().flatten().collect())
    }

    // ── Default identity ───────────────────────────────────────────

    /// The authenticated user, fetched at most once per client.
    ///
    /// Concurrent first callers share one in-flight credentials request.
    /// A failed lookup is not cached; the next caller retries.
    pub async fn identity(&self) -> Result<&Identity> {
        self.inner
            .identity
            .get_or_try_init(|| self.fetch_identity())
            .await
    }

    pub async fn screen_name(&self) -> Result<String> {
        Ok(self.identity().await?.screen_name.clone())
    }

    pub async fn user_id(&self) -> Result<i64> {
        Ok(self.identity().await?.user_id)
    }

    /// [`merge_identifier`], falling back to the authenticated user's
    /// screen name when no identifier is given.
    pub async fn merge_identifier_or_default(
        &self,
        options: &Options,
        identifier: Option<&Identifier>,
        prefix: Option<&str>,
    ) -> Result<Options> {
        match identifier {
            Some(identifier) => Ok(merge_identifier(options, identifier, prefix)),
            None => {
                let own = Identifier::TextReference(self.screen_name().await?);
                Ok(merge_identifier(options, &own, prefix))
            }
        }
    }

    async fn fetch_identity(&self) -> Result<Identity> {
        let request = Request::get(self.inner.config.credentials_path.clone(), Options::new());
        let response = self.perform(&request).await?;
        let user_id = response
            .body
            .get("id")
            .and_then(Value::as_i64)
            .ok_or(Error::Identity("id"))?;
        let screen_name = response
            .body
            .get("screen_name")
            .and_then(Value::as_str)
            .ok_or(Error::Identity("screen_name"))?
            .to_string();
        debug!("default identity: @{} ({})", screen_name, user_id);
        Ok(Identity {
            user_id,
            screen_name,
        })
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.config.base_url)
            .field("identity", &self.inner.identity.get())
            .finish_non_exhaustive()
    }
}
